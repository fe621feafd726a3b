pub mod query;
pub mod request;
pub mod response;

pub use query::{read_csv, read_id_param, read_int, read_string, ParamError, QueryValues};
pub use request::{decode_json, read_json, DecodeError, DEFAULT_MAX_BODY_BYTES};
pub use response::{write_json, Envelope};
