pub mod distecna;
pub mod elit;
pub mod error;
pub mod feed;
pub mod http;
pub mod images;
pub mod nb;
pub mod normalize;
pub(crate) mod retry;

pub use distecna::{parse_listing, total_pages, DistecnaProduct};
pub use elit::sheet::{parse_product_sheet, ElitSheet};
pub use elit::types::ElitProduct;
pub use elit::ElitClient;
pub use error::SupplierError;
pub use feed::{Feed, RejectedItem};
pub use http::build_http_client;
pub use images::{
    image_host_from_config, is_available, rehost_or_keep, should_rehost_elit, should_rehost_nb,
    HttpImageHost, ImageHost, KeepOriginal,
};
pub use nb::types::{NbBrand, NbCategory, NbItemDetail, NbProduct};
pub use nb::NbClient;
pub use normalize::{normalize_elit, normalize_nb};
