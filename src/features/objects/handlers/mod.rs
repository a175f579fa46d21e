pub mod object_handler;

pub use object_handler::{
    __path_delete_object, __path_delete_objects, __path_download_file,
    __path_download_to_local, __path_get_object_url, __path_get_upload_url, __path_list_objects,
    __path_upload, delete_object, delete_objects, download_file, download_to_local,
    get_object_url, get_upload_url, list_objects, upload,
};
