pub mod bit_string;
pub mod data_value;
pub mod date_time;
pub mod enumerations;
pub mod object_id;
pub mod object_type;
pub mod property_id;

pub use bit_string::{pack_bits, BitString};
pub use data_value::DataValue;
pub use date_time::{Date, DateTime, Time};
pub use enumerations::{ErrorClass, ErrorCode, EventState, MaxApdu, MaxSegments, Segmentation};
pub use object_id::{ObjectId, MAX_INSTANCE, MAX_OBJECT_TYPE};
pub use object_type::ObjectType;
pub use property_id::{PropertyId, MAX_PROPERTY_ID};
