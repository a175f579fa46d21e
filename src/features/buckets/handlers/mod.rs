pub mod bucket_handler;

pub use bucket_handler::{
    __path_bucket_exists, __path_delete_bucket, __path_get_bucket_policy, __path_list_buckets,
    __path_make_bucket, bucket_exists, delete_bucket, get_bucket_policy, list_buckets,
    make_bucket,
};
