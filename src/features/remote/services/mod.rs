mod remote_file_service;

pub use remote_file_service::RemoteFileService;
