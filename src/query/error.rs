use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Sorting by '{0}' is not supported for this resource.")]
    UnsortableAttribute(String),
}
