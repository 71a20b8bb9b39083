use crate::errors::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

// exactly two states: no root established yet, or one active project whose
// root is fixed until the next establishment
#[derive(Debug, Clone)]
pub enum Session {
    Unconfigured,
    Active(Project),
}

#[derive(Debug, Clone)]
pub struct Project {
    // canonical absolute path
    pub root: PathBuf,
    // final component of the root, for display
    pub name: String,
}

#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    pub fn unconfigured() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Session::Unconfigured)),
        }
    }

    pub fn with_root(root: &Path) -> anyhow::Result<Self> {
        let handle = Self::unconfigured();
        handle.establish(root)?;
        Ok(handle)
    }

    // resources call this before touching any caller-supplied path string
    pub fn project(&self) -> AppResult<Project> {
        match &*self.inner.read().unwrap_or_else(PoisonError::into_inner) {
            Session::Active(project) => Ok(project.clone()),
            Session::Unconfigured => Err(AppError::SessionNotConfigured),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // replaces any active session; the stored root is canonical so later
    // containment checks compare against physical paths
    pub fn establish(&self, root: &Path) -> AppResult<Project> {
        if !root.is_dir() {
            return Err(AppError::InvalidRoot(format!(
                "{} does not exist or is not a directory",
                root.display()
            )));
        }
        let canonical = dunce::canonicalize(root)
            .map_err(|e| AppError::InvalidRoot(format!("{}: {e}", root.display())))?;
        let name = canonical
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| canonical.display().to_string());
        let project = Project {
            root: canonical,
            name,
        };
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) =
            Session::Active(project.clone());
        Ok(project)
    }
}
