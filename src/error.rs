#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StoreErrorKind {
    #[error("Cannot redefine property '{key}': {message}")]
    DescriptorError { key: String, message: String },

    #[error("Cannot assign to read only property '{key}'")]
    ReadOnlyError { key: String },

    #[error("Cannot delete non-configurable property '{key}'")]
    NotConfigurableError { key: String },

    #[error("Cannot add property '{key}', object is not extensible")]
    NotExtensibleError { key: String },

    #[error("Converting circular structure (cycle at '{path}')")]
    CyclicStructureError { path: String },

    #[error("JSON error: {message}")]
    JsonError { message: String },
}

#[derive(Debug, Clone)]
pub struct StoreErrorData {
    pub kind: StoreErrorKind,
    pub rust_file: &'static str,
    pub rust_line: u32,
    pub rust_method: String,
}

#[derive(thiserror::Error, Debug, Clone)]
#[error("{}", .inner.kind)]
pub struct StoreError {
    pub inner: Box<StoreErrorData>,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, rust_file: &'static str, rust_line: u32, rust_method: &str) -> Self {
        StoreError {
            inner: Box::new(StoreErrorData {
                kind,
                rust_file,
                rust_line,
                rust_method: rust_method.to_string(),
            }),
        }
    }

    pub fn kind(&self) -> &StoreErrorKind {
        &self.inner.kind
    }

    pub fn message(&self) -> String {
        self.inner.kind.to_string()
    }

    /// `file:line` of the Rust code that raised the error.
    pub fn location(&self) -> String {
        format!("{}:{} ({})", self.inner.rust_file, self.inner.rust_line, self.inner.rust_method)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        crate::make_store_error!(StoreErrorKind::JsonError { message: err.to_string() })
    }
}

impl From<StoreError> for std::io::Error {
    fn from(err: StoreError) -> std::io::Error {
        std::io::Error::other(err.to_string())
    }
}

// Macros (rather than functions) so that `file!()` and `line!()` expand at
// the site raising the error.
#[macro_export]
macro_rules! make_store_error {
    ($kind:expr) => {
        $crate::StoreError::new($kind, file!(), line!(), $crate::function_name!())
    };
}

#[macro_export]
macro_rules! raise_descriptor_error {
    ($key:expr, $msg:expr) => {
        $crate::make_store_error!($crate::StoreErrorKind::DescriptorError {
            key: $key.to_string(),
            message: $msg.to_string(),
        })
    };
}

#[macro_export]
macro_rules! raise_read_only_error {
    ($key:expr) => {
        $crate::make_store_error!($crate::StoreErrorKind::ReadOnlyError { key: $key.to_string() })
    };
}

#[macro_export]
macro_rules! raise_not_configurable_error {
    ($key:expr) => {
        $crate::make_store_error!($crate::StoreErrorKind::NotConfigurableError { key: $key.to_string() })
    };
}

#[macro_export]
macro_rules! raise_not_extensible_error {
    ($key:expr) => {
        $crate::make_store_error!($crate::StoreErrorKind::NotExtensibleError { key: $key.to_string() })
    };
}

#[macro_export]
macro_rules! raise_cyclic_structure_error {
    ($path:expr) => {
        $crate::make_store_error!($crate::StoreErrorKind::CyclicStructureError { path: $path.to_string() })
    };
}

#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        // remove the trailing "::f"
        &name[..name.len() - 3]
    }};
}
