use crate::error::AppError;
use crate::storage::KeyValueStore;
use std::path::{Path, PathBuf};

const STORE_DIR_ENV_VAR: &str = "ASCIITODO_STORE_DIR";
const APP_DIR_NAME: &str = "asciitodo";

pub fn store_dir() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_DIR_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }
    app_dir()
}

/// Per-user application directory, shared by the task store and the config.
pub fn app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

/// One file per key under a directory: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(store_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !valid {
            return Err(AppError::invalid_input(format!("invalid storage key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|err| AppError::io(err.to_string()))?;
        std::fs::write(&path, value)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions)
                .map_err(|err| AppError::io(err.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FileStore;
    use crate::storage::KeyValueStore;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("asciitodo-{nanos}-{name}"))
    }

    #[test]
    fn missing_key_reads_as_none() {
        let dir = temp_path("missing");
        let store = FileStore::new(&dir);

        assert_eq!(store.get_item("ascii-todos").unwrap(), None);
    }

    #[test]
    fn set_then_get_returns_value_and_creates_dir() {
        let dir = temp_path("set-get");
        let mut store = FileStore::new(&dir);

        store.set_item("ascii-todos", "[]").unwrap();
        let value = store.get_item("ascii-todos").unwrap();
        let on_disk = fs::read_to_string(dir.join("ascii-todos.json")).unwrap();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(value.as_deref(), Some("[]"));
        assert_eq!(on_disk, "[]");
    }

    #[test]
    fn keys_with_path_separators_are_rejected() {
        let store = FileStore::new(temp_path("bad-key"));

        let err = store.get_item("../escape").unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[cfg(unix)]
    #[test]
    fn written_files_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = temp_path("perms");
        let mut store = FileStore::new(&dir);
        store.set_item("ascii-todos", "[]").unwrap();

        let mode = fs::metadata(dir.join("ascii-todos.json"))
            .unwrap()
            .permissions()
            .mode();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(mode & 0o777, 0o600);
    }
}
