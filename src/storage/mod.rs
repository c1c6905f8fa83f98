// S3-compatible object storage gateway. File bytes go straight between the
// client and the object store on download; the service only signs URLs.

mod s3_client;

pub use s3_client::{ObjectStorage, StorageError, DOWNLOAD_URL_TTL};
