use bacstack_core::types::{BitString, DataValue, Date, DateTime, ObjectId, Time};

/// An owned bit string, most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientBitString {
    pub unused_bits: u8,
    pub data: Vec<u8>,
}

impl ClientBitString {
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut data = vec![0u8; bits.len().div_ceil(8)];
        for (i, _) in bits.iter().enumerate().filter(|(_, set)| **set) {
            data[i / 8] |= 0x80 >> (i % 8);
        }
        Self {
            unused_bits: (data.len() * 8 - bits.len()) as u8,
            data,
        }
    }

    pub fn as_bit_string(&self) -> BitString<'_> {
        BitString::new(self.unused_bits, &self.data)
    }

    pub fn bit(&self, index: usize) -> Option<bool> {
        self.as_bit_string().bit(index)
    }
}

/// Owned counterpart of [`DataValue`], detached from the frame it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientDataValue {
    Null,
    Boolean(bool),
    Unsigned(u32),
    Signed(i32),
    Real(f32),
    Double(f64),
    OctetString(Vec<u8>),
    CharacterString(String),
    BitString(ClientBitString),
    Enumerated(u32),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    ObjectId(ObjectId),
    OpeningTag(u8),
    ClosingTag(u8),
}

impl ClientDataValue {
    /// Borrows the value for encoding.
    pub fn as_data_value(&self) -> DataValue<'_> {
        match self {
            Self::Null => DataValue::Null,
            Self::Boolean(v) => DataValue::Boolean(*v),
            Self::Unsigned(v) => DataValue::Unsigned(*v),
            Self::Signed(v) => DataValue::Signed(*v),
            Self::Real(v) => DataValue::Real(*v),
            Self::Double(v) => DataValue::Double(*v),
            Self::OctetString(v) => DataValue::OctetString(v),
            Self::CharacterString(v) => DataValue::CharacterString(v),
            Self::BitString(v) => DataValue::BitString(v.as_bit_string()),
            Self::Enumerated(v) => DataValue::Enumerated(*v),
            Self::Date(v) => DataValue::Date(*v),
            Self::Time(v) => DataValue::Time(*v),
            Self::DateTime(v) => DataValue::DateTime(*v),
            Self::ObjectId(v) => DataValue::ObjectId(*v),
            Self::OpeningTag(t) => DataValue::OpeningTag(*t),
            Self::ClosingTag(t) => DataValue::ClosingTag(*t),
        }
    }
}

impl From<DataValue<'_>> for ClientDataValue {
    fn from(value: DataValue<'_>) -> Self {
        match value {
            DataValue::Null => Self::Null,
            DataValue::Boolean(v) => Self::Boolean(v),
            DataValue::Unsigned(v) => Self::Unsigned(v),
            DataValue::Signed(v) => Self::Signed(v),
            DataValue::Real(v) => Self::Real(v),
            DataValue::Double(v) => Self::Double(v),
            DataValue::OctetString(v) => Self::OctetString(v.to_vec()),
            DataValue::CharacterString(v) => Self::CharacterString(v.to_string()),
            DataValue::BitString(v) => Self::BitString(ClientBitString {
                unused_bits: v.unused_bits,
                data: v.data.to_vec(),
            }),
            DataValue::Enumerated(v) => Self::Enumerated(v),
            DataValue::Date(v) => Self::Date(v),
            DataValue::Time(v) => Self::Time(v),
            DataValue::DateTime(v) => Self::DateTime(v),
            DataValue::ObjectId(v) => Self::ObjectId(v),
            DataValue::OpeningTag(t) => Self::OpeningTag(t),
            DataValue::ClosingTag(t) => Self::ClosingTag(t),
        }
    }
}

/// Result of a ReadProperty call.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// The property held exactly one value.
    Value(ClientDataValue),
    /// OBJECT_LIST of a device.
    ObjectList(Vec<ObjectId>),
    /// Any other multi-valued property, in wire order.
    List(Vec<ClientDataValue>),
}

impl PropertyValue {
    pub fn into_values(self) -> Vec<ClientDataValue> {
        match self {
            Self::Value(v) => vec![v],
            Self::ObjectList(ids) => ids.into_iter().map(ClientDataValue::ObjectId).collect(),
            Self::List(values) => values,
        }
    }
}
