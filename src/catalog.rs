mod descriptor;
mod error;
mod lookup;


pub use descriptor::{FileDescriptor, PatientDetails};
pub use error::{CatalogError, Result};
pub use lookup::FileCatalog;
