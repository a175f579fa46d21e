mod remote_dto;

pub use remote_dto::RemoteDownloadParams;
