use std::fmt;
use std::str::FromStr;

use anyhow::bail;

const POEM_PREFIX: &str = "/poem/";

/// The two screens, addressed like paths: `/` and `/poem/{poem_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Collection,
    Poem {
        id: String,
    },
}

impl Route {
    pub fn poem(id: impl Into<String>) -> Self {
        Route::Poem { id: id.into() }
    }

    pub fn poem_id(&self) -> Option<&str> {
        match self {
            Route::Poem { id } => Some(id),
            Route::Collection => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Collection => f.write_str("/"),
            Route::Poem { id } => write!(f, "{POEM_PREFIX}{id}"),
        }
    }
}

impl FromStr for Route {
    type Err = anyhow::Error;

    fn from_str(path: &str) -> anyhow::Result<Self> {
        let path = path.trim();
        if path.is_empty() || path == "/" {
            return Ok(Route::Collection);
        }
        if let Some(id) = path.strip_prefix(POEM_PREFIX) {
            let id = id.trim_end_matches('/');
            if !id.is_empty() && !id.contains('/') {
                return Ok(Route::poem(id));
            }
        }
        bail!("unknown route {path:?}; expected / or /poem/<id>")
    }
}
