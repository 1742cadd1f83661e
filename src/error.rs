use std::fmt::{Debug, Display};

/// Everything that can go wrong when working with `Array`, `List` or the sort engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The operation needs at least one element.
    EmptyContainer,
    /// An argument was empty (zero stride, zero capacity, empty element bytes).
    EmptyArg,
    /// Memory for a new container could not be obtained.
    BadAlloc,
    /// The copy callback refused to duplicate an element.
    CopyFailed,
    /// Index past the end of the container.
    OutOfBounds,
    /// The operation needs a callback the container was built without.
    MissingCallback,
    /// Nothing to do, the container was left as it was.
    NoOp,
    /// Pop from an empty list.
    NoData,
    /// No element matched, or the node handle does not belong to the list.
    NotFound,
    /// Element bytes do not match the container stride.
    TypeMismatch,
}

impl Error {
    /// Stable label of the error, never changes between releases.
    pub fn label(&self) -> &'static str {
        match self {
            Error::EmptyContainer => "E_EMPTY_OBJ",
            Error::EmptyArg => "E_EMPTY_ARG",
            Error::BadAlloc => "E_BAD_ALLOC",
            Error::CopyFailed => "E_MEMCOPY",
            Error::OutOfBounds => "E_OUTOFBOUNDS",
            Error::MissingCallback => "E_EMPTY_FUNC",
            Error::NoOp => "E_NOOP",
            Error::NoData => "E_NODATA",
            Error::NotFound => "E_DOESNT_EXIST",
            Error::TypeMismatch => "E_BAD_TYPE",
        }
    }

    /// Stable numeric discriminator, `0` is reserved for success.
    pub fn code(&self) -> i32 {
        match self {
            Error::EmptyContainer => -1,
            Error::EmptyArg => -2,
            Error::BadAlloc => -3,
            Error::CopyFailed => -4,
            Error::OutOfBounds => -5,
            Error::MissingCallback => -6,
            Error::NoOp => -7,
            Error::NoData => -8,
            Error::NotFound => -9,
            Error::TypeMismatch => -10,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Error::EmptyContainer => "container is empty",
            Error::EmptyArg => "argument is empty",
            Error::BadAlloc => "failed to allocate container memory",
            Error::CopyFailed => "failed to copy element",
            Error::OutOfBounds => "index is out of bounds",
            Error::MissingCallback => "required callback is not configured",
            Error::NoOp => "nothing to do",
            Error::NoData => "no data to pop",
            Error::NotFound => "element does not exist",
            Error::TypeMismatch => "element size does not match container stride",
        };
        write!(f, "{} ({})", text, self.label())
    }
}

impl std::error::Error for Error {}
