//! Thrift binary protocol bridge for serde types.
//!
//! Values are first lowered into an in-memory [`Value`] tree so that every
//! field and collection header can carry its Thrift type code, then written
//! out big-endian as `TBinaryProtocol` does. Decoding reads the tree back
//! (the binary protocol is self-describing) and drives serde from it.
//!
//! Mapping:
//!
//! - structs become Thrift structs whose field ids are `1..=n` in declaration
//!   order; `None` fields are omitted and come back as `None`
//! - sequences and tuples become lists, maps become maps
//! - unit enum variants become `i32` values, data-carrying variants become
//!   single-field unions keyed by `variant_index + 1`
//! - a body that is not itself a struct travels as field `0` of a wrapper
//!   struct, the same slot Thrift uses for a method's `success` result

use bytes::{Buf, BufMut, BytesMut};
use serde::de::{self, IntoDeserializer};
use serde::ser::{self, Serialize};
use std::fmt;
use thiserror::Error;

mod ttype {
    pub const STOP: i8 = 0;
    pub const BOOL: i8 = 2;
    pub const BYTE: i8 = 3;
    pub const DOUBLE: i8 = 4;
    pub const I16: i8 = 6;
    pub const I32: i8 = 8;
    pub const I64: i8 = 10;
    pub const STRING: i8 = 11;
    pub const STRUCT: i8 = 12;
    pub const MAP: i8 = 13;
    pub const SET: i8 = 14;
    pub const LIST: i8 = 15;
}

/// Deepest nesting accepted when reading a payload.
const MAX_DEPTH: usize = 64;

/// Field id of the wrapper slot holding a non-struct body.
const RESULT_FIELD_ID: i16 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThriftError {
    #[error("{0}")]
    Message(String),

    #[error("unexpected end of payload")]
    Eof,

    #[error("unknown thrift type code {0}")]
    UnknownType(i8),

    #[error("negative length {0}")]
    NegativeLength(i32),

    #[error("length {0} does not fit the wire format")]
    TooLong(usize),

    #[error("payload nesting is too deep")]
    TooDeep,

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// Structs carry field ids, not names, so they can only be read into a
    /// known struct or enum type.
    #[error(
        "cannot read a thrift struct without its type; internally tagged and untagged shapes are not supported"
    )]
    UntypedStruct,

    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: &'static str,
    },
}

impl ser::Error for ThriftError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ThriftError::Message(msg.to_string())
    }
}

impl de::Error for ThriftError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ThriftError::Message(msg.to_string())
    }
}

/// Serializes `value` into a Thrift binary struct payload.
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>, ThriftError>
where
    T: Serialize + ?Sized,
{
    let value = match required(value.serialize(ValueSerializer)?)? {
        value @ Value::Struct(_) => value,
        other => Value::Struct(vec![(RESULT_FIELD_ID, other)]),
    };

    let mut buf = BytesMut::new();
    value.write(&mut buf)?;
    Ok(buf.to_vec())
}

/// Deserializes a Thrift binary struct payload into `T`.
pub fn from_slice<T>(bytes: &[u8]) -> Result<T, ThriftError>
where
    T: de::DeserializeOwned,
{
    let mut cursor = bytes;
    let value = Value::read(ttype::STRUCT, &mut cursor, 0)?;

    if cursor.has_remaining() {
        return Err(ThriftError::TrailingBytes(cursor.remaining()));
    }

    let value = match value {
        Value::Struct(fields) => match <[(i16, Value); 1]>::try_from(fields) {
            Ok([(RESULT_FIELD_ID, inner)]) => inner,
            Ok(field) => Value::Struct(Vec::from(field)),
            Err(fields) => Value::Struct(fields),
        },
        other => other,
    };

    T::deserialize(ValueDeserializer(value))
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    Binary(Vec<u8>),
    Struct(Vec<(i16, Value)>),
    Map {
        key_type: i8,
        value_type: i8,
        entries: Vec<(Value, Value)>,
    },
    List {
        elem_type: i8,
        items: Vec<Value>,
    },
}

impl Value {
    fn type_code(&self) -> i8 {
        match self {
            Value::Bool(_) => ttype::BOOL,
            Value::Byte(_) => ttype::BYTE,
            Value::I16(_) => ttype::I16,
            Value::I32(_) => ttype::I32,
            Value::I64(_) => ttype::I64,
            Value::Double(_) => ttype::DOUBLE,
            Value::Binary(_) => ttype::STRING,
            Value::Struct(_) => ttype::STRUCT,
            Value::Map { .. } => ttype::MAP,
            Value::List { .. } => ttype::LIST,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Double(_) => "double",
            Value::Binary(_) => "binary",
            Value::Struct(_) => "struct",
            Value::Map { .. } => "map",
            Value::List { .. } => "list",
        }
    }

    fn write(&self, buf: &mut BytesMut) -> Result<(), ThriftError> {
        match self {
            Value::Bool(v) => buf.put_i8(i8::from(*v)),
            Value::Byte(v) => buf.put_i8(*v),
            Value::I16(v) => buf.put_i16(*v),
            Value::I32(v) => buf.put_i32(*v),
            Value::I64(v) => buf.put_i64(*v),
            Value::Double(v) => buf.put_f64(*v),
            Value::Binary(bytes) => {
                buf.put_i32(wire_len(bytes.len())?);
                buf.put_slice(bytes);
            }
            Value::Struct(fields) => {
                for (id, value) in fields {
                    buf.put_i8(value.type_code());
                    buf.put_i16(*id);
                    value.write(buf)?;
                }
                buf.put_i8(ttype::STOP);
            }
            Value::Map {
                key_type,
                value_type,
                entries,
            } => {
                buf.put_i8(*key_type);
                buf.put_i8(*value_type);
                buf.put_i32(wire_len(entries.len())?);
                for (key, value) in entries {
                    key.write(buf)?;
                    value.write(buf)?;
                }
            }
            Value::List { elem_type, items } => {
                buf.put_i8(*elem_type);
                buf.put_i32(wire_len(items.len())?);
                for item in items {
                    item.write(buf)?;
                }
            }
        }

        Ok(())
    }

    fn read(type_code: i8, buf: &mut &[u8], depth: usize) -> Result<Value, ThriftError> {
        if depth > MAX_DEPTH {
            return Err(ThriftError::TooDeep);
        }

        let value = match type_code {
            ttype::BOOL => {
                ensure(buf.remaining(), 1)?;
                Value::Bool(buf.get_i8() != 0)
            }
            ttype::BYTE => {
                ensure(buf.remaining(), 1)?;
                Value::Byte(buf.get_i8())
            }
            ttype::DOUBLE => {
                ensure(buf.remaining(), 8)?;
                Value::Double(buf.get_f64())
            }
            ttype::I16 => {
                ensure(buf.remaining(), 2)?;
                Value::I16(buf.get_i16())
            }
            ttype::I32 => {
                ensure(buf.remaining(), 4)?;
                Value::I32(buf.get_i32())
            }
            ttype::I64 => {
                ensure(buf.remaining(), 8)?;
                Value::I64(buf.get_i64())
            }
            ttype::STRING => {
                let len = read_len(buf)?;
                ensure(buf.remaining(), len)?;
                let bytes = buf[..len].to_vec();
                buf.advance(len);
                Value::Binary(bytes)
            }
            ttype::STRUCT => {
                let mut fields = Vec::new();
                loop {
                    ensure(buf.remaining(), 1)?;
                    let field_type = buf.get_i8();
                    if field_type == ttype::STOP {
                        break;
                    }
                    ensure(buf.remaining(), 2)?;
                    let id = buf.get_i16();
                    fields.push((id, Value::read(field_type, buf, depth + 1)?));
                }
                Value::Struct(fields)
            }
            ttype::MAP => {
                ensure(buf.remaining(), 2)?;
                let key_type = buf.get_i8();
                let value_type = buf.get_i8();
                let len = read_len(buf)?;
                let mut entries = Vec::with_capacity(len.min(buf.remaining()));
                for _ in 0..len {
                    let key = Value::read(key_type, buf, depth + 1)?;
                    let value = Value::read(value_type, buf, depth + 1)?;
                    entries.push((key, value));
                }
                Value::Map {
                    key_type,
                    value_type,
                    entries,
                }
            }
            ttype::SET | ttype::LIST => {
                ensure(buf.remaining(), 1)?;
                let elem_type = buf.get_i8();
                let len = read_len(buf)?;
                let mut items = Vec::with_capacity(len.min(buf.remaining()));
                for _ in 0..len {
                    items.push(Value::read(elem_type, buf, depth + 1)?);
                }
                Value::List { elem_type, items }
            }
            other => return Err(ThriftError::UnknownType(other)),
        };

        Ok(value)
    }
}

#[inline]
fn ensure(remaining: usize, needed: usize) -> Result<(), ThriftError> {
    if remaining < needed {
        Err(ThriftError::Eof)
    } else {
        Ok(())
    }
}

fn read_len(buf: &mut &[u8]) -> Result<usize, ThriftError> {
    ensure(buf.remaining(), 4)?;
    let len = buf.get_i32();
    usize::try_from(len).map_err(|_| ThriftError::NegativeLength(len))
}

fn wire_len(len: usize) -> Result<i32, ThriftError> {
    i32::try_from(len).map_err(|_| ThriftError::TooLong(len))
}

fn field_id(variant_or_field_index: u32) -> Result<i16, ThriftError> {
    variant_or_field_index
        .checked_add(1)
        .and_then(|id| i16::try_from(id).ok())
        .ok_or_else(|| ThriftError::Message("too many fields for a thrift struct".to_string()))
}

/// `None` only has a representation as an omitted struct field.
fn required(value: Option<Value>) -> Result<Value, ThriftError> {
    value.ok_or_else(|| {
        ThriftError::Message("`None` is only supported as a struct field".to_string())
    })
}

/// Returns the single type code shared by `values`; empty collections use
/// `STRUCT`, which readers ignore when the length is zero.
fn uniform_type<'a>(mut values: impl Iterator<Item = &'a Value>) -> Result<i8, ThriftError> {
    let Some(first) = values.next() else {
        return Ok(ttype::STRUCT);
    };
    let code = first.type_code();

    if values.all(|value| value.type_code() == code) {
        Ok(code)
    } else {
        Err(ThriftError::Message(
            "thrift collections must hold a single element type".to_string(),
        ))
    }
}

fn unexpected(expected: &'static str, found: &Value) -> ThriftError {
    ThriftError::Unexpected {
        expected,
        found: found.kind(),
    }
}

// Serialization

struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Option<Value>;
    type Error = ThriftError;

    type SerializeSeq = ListBuilder;
    type SerializeTuple = ListBuilder;
    type SerializeTupleStruct = ListBuilder;
    type SerializeTupleVariant = TupleVariantBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = StructBuilder;
    type SerializeStructVariant = StructVariantBuilder;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Byte(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::I16(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::I32(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::I64(v)))
    }

    // Thrift has no unsigned types; each widens to the next signed one.
    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Byte(v as i8)))
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::I32(i32::from(v))))
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::I64(i64::from(v))))
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        i64::try_from(v)
            .map(|v| Some(Value::I64(v)))
            .map_err(|_| ThriftError::Message(format!("{v} does not fit a thrift i64")))
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Double(f64::from(v))))
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Double(v)))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Binary(v.to_string().into_bytes())))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Binary(v.as_bytes().to_vec())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Binary(v.to_vec())))
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Struct(Vec::new())))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        i32::try_from(variant_index)
            .map(|index| Some(Value::I32(index)))
            .map_err(|_| ThriftError::Message("enum variant index out of range".to_string()))
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let payload = required(value.serialize(ValueSerializer)?)?;
        Ok(Some(Value::Struct(vec![(field_id(variant_index)?, payload)])))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(ListBuilder::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(ListBuilder::with_capacity(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Ok(ListBuilder::with_capacity(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(TupleVariantBuilder {
            id: field_id(variant_index)?,
            list: ListBuilder::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(MapBuilder {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(StructBuilder::with_capacity(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(StructVariantBuilder {
            id: field_id(variant_index)?,
            inner: StructBuilder::with_capacity(len),
        })
    }
}

struct ListBuilder {
    items: Vec<Value>,
}

impl ListBuilder {
    fn with_capacity(len: usize) -> Self {
        Self {
            items: Vec::with_capacity(len),
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<(), ThriftError>
    where
        T: Serialize + ?Sized,
    {
        self.items.push(required(value.serialize(ValueSerializer)?)?);
        Ok(())
    }

    fn finish(self) -> Result<Value, ThriftError> {
        let elem_type = uniform_type(self.items.iter())?;
        Ok(Value::List {
            elem_type,
            items: self.items,
        })
    }
}

impl ser::SerializeSeq for ListBuilder {
    type Ok = Option<Value>;
    type Error = ThriftError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish().map(Some)
    }
}

impl ser::SerializeTuple for ListBuilder {
    type Ok = Option<Value>;
    type Error = ThriftError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish().map(Some)
    }
}

impl ser::SerializeTupleStruct for ListBuilder {
    type Ok = Option<Value>;
    type Error = ThriftError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish().map(Some)
    }
}

struct TupleVariantBuilder {
    id: i16,
    list: ListBuilder,
}

impl ser::SerializeTupleVariant for TupleVariantBuilder {
    type Ok = Option<Value>;
    type Error = ThriftError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.list.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Struct(vec![(self.id, self.list.finish()?)])))
    }
}

struct MapBuilder {
    entries: Vec<(Value, Value)>,
    pending_key: Option<Value>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Option<Value>;
    type Error = ThriftError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.pending_key = Some(required(key.serialize(ValueSerializer)?)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| ThriftError::Message("map value without a key".to_string()))?;
        let value = required(value.serialize(ValueSerializer)?)?;
        self.entries.push((key, value));
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        let key_type = uniform_type(self.entries.iter().map(|(key, _)| key))?;
        let value_type = uniform_type(self.entries.iter().map(|(_, value)| value))?;

        Ok(Some(Value::Map {
            key_type,
            value_type,
            entries: self.entries,
        }))
    }
}

struct StructBuilder {
    fields: Vec<(i16, Value)>,
    next_index: u32,
}

impl StructBuilder {
    fn with_capacity(len: usize) -> Self {
        Self {
            fields: Vec::with_capacity(len),
            next_index: 0,
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<(), ThriftError>
    where
        T: Serialize + ?Sized,
    {
        let id = field_id(self.next_index)?;
        self.next_index += 1;

        if let Some(value) = value.serialize(ValueSerializer)? {
            self.fields.push((id, value));
        }
        Ok(())
    }
}

impl ser::SerializeStruct for StructBuilder {
    type Ok = Option<Value>;
    type Error = ThriftError;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    // Skipped fields still consume an id so later fields keep theirs.
    fn skip_field(&mut self, _key: &'static str) -> Result<(), Self::Error> {
        self.next_index += 1;
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Struct(self.fields)))
    }
}

struct StructVariantBuilder {
    id: i16,
    inner: StructBuilder,
}

impl ser::SerializeStructVariant for StructVariantBuilder {
    type Ok = Option<Value>;
    type Error = ThriftError;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.inner.push(value)
    }

    fn skip_field(&mut self, _key: &'static str) -> Result<(), Self::Error> {
        self.inner.next_index += 1;
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        let payload = Value::Struct(self.inner.fields);
        Ok(Some(Value::Struct(vec![(self.id, payload)])))
    }
}

// Deserialization

struct ValueDeserializer(Value);

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = ThriftError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Value::Bool(v) => visitor.visit_bool(v),
            Value::Byte(v) => visitor.visit_i8(v),
            Value::I16(v) => visitor.visit_i16(v),
            Value::I32(v) => visitor.visit_i32(v),
            Value::I64(v) => visitor.visit_i64(v),
            Value::Double(v) => visitor.visit_f64(v),
            Value::Binary(bytes) => match String::from_utf8(bytes) {
                Ok(text) => visitor.visit_string(text),
                Err(err) => visitor.visit_byte_buf(err.into_bytes()),
            },
            Value::Struct(fields) if fields.is_empty() => visitor.visit_unit(),
            Value::Struct(_) => Err(ThriftError::UntypedStruct),
            Value::Map { entries, .. } => visitor.visit_map(EntryAccess::new(entries)),
            Value::List { items, .. } => visitor.visit_seq(ItemAccess {
                items: items.into_iter(),
            }),
        }
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Value::Byte(v) => visitor.visit_u8(v as u8),
            other => ValueDeserializer(other).deserialize_any(visitor),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Value::Binary(bytes) => {
                let text = String::from_utf8(bytes)
                    .map_err(|err| ThriftError::Message(err.to_string()))?;
                visitor.visit_string(text)
            }
            other => Err(unexpected("string", &other)),
        }
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Value::Binary(bytes) => visitor.visit_byte_buf(bytes),
            other => ValueDeserializer(other).deserialize_any(visitor),
        }
    }

    // Absent optional fields never reach the deserializer.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Value::Struct(fields) if fields.is_empty() => visitor.visit_unit(),
            other => Err(unexpected("empty struct", &other)),
        }
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Value::Struct(values) => visitor.visit_map(StructAccess {
                fields: values.into_iter(),
                names: fields,
                pending: None,
            }),
            other => Err(unexpected("struct", &other)),
        }
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Value::I32(index) => {
                let index = u32::try_from(index)
                    .map_err(|_| ThriftError::Message(format!("invalid enum value {index}")))?;
                visitor.visit_enum(EnumAccess {
                    index,
                    payload: None,
                })
            }
            Value::Struct(fields) => match <[(i16, Value); 1]>::try_from(fields) {
                Ok([(id, payload)]) if id > 0 => visitor.visit_enum(EnumAccess {
                    index: (id - 1) as u32,
                    payload: Some(payload),
                }),
                _ => Err(ThriftError::Message(
                    "a union must set exactly one field".to_string(),
                )),
            },
            other => Err(unexpected("enum", &other)),
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u16 u32 u64 u128 f32 f64 char
        seq tuple tuple_struct map identifier
    }
}

struct ItemAccess {
    items: std::vec::IntoIter<Value>,
}

impl<'de> de::SeqAccess<'de> for ItemAccess {
    type Error = ThriftError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.items.next() {
            Some(item) => seed.deserialize(ValueDeserializer(item)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

struct EntryAccess {
    entries: std::vec::IntoIter<(Value, Value)>,
    pending: Option<Value>,
}

impl EntryAccess {
    fn new(entries: Vec<(Value, Value)>) -> Self {
        Self {
            entries: entries.into_iter(),
            pending: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for EntryAccess {
    type Error = ThriftError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((key, value)) => {
                self.pending = Some(value);
                seed.deserialize(ValueDeserializer(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let value = self
            .pending
            .take()
            .ok_or_else(|| ThriftError::Message("map value requested before key".to_string()))?;
        seed.deserialize(ValueDeserializer(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

/// Presents a Thrift struct to serde as a map keyed by field name.
///
/// Field ids without a matching name (newer writers, removed fields) are
/// skipped.
struct StructAccess {
    fields: std::vec::IntoIter<(i16, Value)>,
    names: &'static [&'static str],
    pending: Option<Value>,
}

impl<'de> de::MapAccess<'de> for StructAccess {
    type Error = ThriftError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        for (id, value) in self.fields.by_ref() {
            let name = usize::try_from(id)
                .ok()
                .and_then(|id| id.checked_sub(1))
                .and_then(|index| self.names.get(index));

            if let Some(name) = name {
                self.pending = Some(value);
                let key: de::value::StrDeserializer<'static, ThriftError> =
                    (*name).into_deserializer();
                return seed.deserialize(key).map(Some);
            }
        }

        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let value = self.pending.take().ok_or_else(|| {
            ThriftError::Message("struct field requested before its id".to_string())
        })?;
        seed.deserialize(ValueDeserializer(value))
    }
}

struct EnumAccess {
    index: u32,
    payload: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumAccess {
    type Error = ThriftError;
    type Variant = VariantPayload;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let index: de::value::U32Deserializer<ThriftError> = self.index.into_deserializer();
        let variant = seed.deserialize(index)?;
        Ok((variant, VariantPayload(self.payload)))
    }
}

struct VariantPayload(Option<Value>);

impl VariantPayload {
    fn into_value(self) -> Result<Value, ThriftError> {
        self.0
            .ok_or_else(|| ThriftError::Message("enum variant carries no data".to_string()))
    }
}

impl<'de> de::VariantAccess<'de> for VariantPayload {
    type Error = ThriftError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.0 {
            None => Ok(()),
            Some(Value::Struct(fields)) if fields.is_empty() => Ok(()),
            Some(other) => Err(unexpected("unit variant", &other)),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(ValueDeserializer(self.into_value()?))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(ValueDeserializer(self.into_value()?), visitor)
    }

    fn struct_variant<V>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_struct(
            ValueDeserializer(self.into_value()?),
            "",
            fields,
            visitor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum Status {
        Active,
        Suspended,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum Shape {
        Circle(f64),
        Rect { w: i32, h: i32 },
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Account {
        id: i64,
        name: String,
        nickname: Option<String>,
        tags: Vec<String>,
        limits: BTreeMap<String, i32>,
        status: Status,
        shape: Shape,
        active: bool,
        small: u8,
    }

    fn account() -> Account {
        Account {
            id: 42,
            name: "alice".to_string(),
            nickname: None,
            tags: vec!["admin".to_string(), "ops".to_string()],
            limits: BTreeMap::from([("cpu".to_string(), 4), ("mem".to_string(), 16)]),
            status: Status::Suspended,
            shape: Shape::Rect { w: 3, h: 4 },
            active: true,
            small: 200,
        }
    }

    #[test]
    fn struct_round_trips() {
        let bytes = to_vec(&account()).unwrap();
        let decoded: Account = from_slice(&bytes).unwrap();
        assert_eq!(decoded, account());
    }

    #[test]
    fn struct_fields_use_declaration_order_ids() {
        #[derive(Serialize)]
        struct Pair {
            a: i32,
            b: bool,
        }

        let bytes = to_vec(&Pair { a: 7, b: true }).unwrap();
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            8, 0, 1, 0, 0, 0, 7, // a: i32, field 1
            2, 0, 2, 1, // b: bool, field 2
            0, // stop
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn none_fields_are_omitted() {
        let mut with_nickname = account();
        with_nickname.nickname = Some("al".to_string());

        let without = to_vec(&account()).unwrap();
        let with = to_vec(&with_nickname).unwrap();
        assert!(with.len() > without.len());

        let decoded: Account = from_slice(&with).unwrap();
        assert_eq!(decoded.nickname.as_deref(), Some("al"));
    }

    #[test]
    fn non_struct_bodies_use_result_field() {
        let bytes = to_vec("hello").unwrap();
        assert_eq!(bytes[0] as i8, ttype::STRING);
        assert_eq!(&bytes[1..3], &[0u8, 0]);

        let decoded: String = from_slice(&bytes).unwrap();
        assert_eq!(decoded, "hello");

        let decoded: Shape = from_slice(&to_vec(&Shape::Circle(1.5)).unwrap()).unwrap();
        assert_eq!(decoded, Shape::Circle(1.5));
    }

    #[test]
    fn unit_encodes_as_empty_struct() {
        assert_eq!(to_vec(&()).unwrap(), vec![0]);
        from_slice::<()>(&[0]).unwrap();
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let bytes = to_vec(&account()).unwrap();
        let err = from_slice::<Account>(&bytes[..bytes.len() - 3]).unwrap_err();
        assert_eq!(err, ThriftError::Eof);
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = to_vec(&account()).unwrap();
        bytes.extend_from_slice(&[1, 2]);
        let err = from_slice::<Account>(&bytes).unwrap_err();
        assert_eq!(err, ThriftError::TrailingBytes(2));
    }

    #[test]
    fn mixed_list_element_types_are_rejected() {
        #[derive(Serialize)]
        #[serde(untagged)]
        enum Either {
            Int(i32),
            Text(String),
        }

        let err = to_vec(&vec![Either::Int(1), Either::Text("x".to_string())]).unwrap_err();
        assert!(matches!(err, ThriftError::Message(_)));
    }

    #[test]
    fn unknown_field_ids_are_skipped() {
        #[derive(Serialize)]
        struct Wide {
            id: i64,
            extra: String,
        }

        #[derive(Debug, Deserialize, PartialEq)]
        struct Narrow {
            id: i64,
        }

        let bytes = to_vec(&Wide {
            id: 9,
            extra: "ignored".to_string(),
        })
        .unwrap();
        assert_eq!(from_slice::<Narrow>(&bytes).unwrap(), Narrow { id: 9 });
    }

    #[test]
    fn internally_tagged_enums_fail_with_a_clear_error() {
        #[derive(Debug, Serialize, Deserialize)]
        #[serde(tag = "kind")]
        enum Event {
            Created { id: i64 },
        }

        let bytes = to_vec(&Event::Created { id: 7 }).unwrap();
        let err = from_slice::<Event>(&bytes).unwrap_err();
        assert_eq!(err, ThriftError::UntypedStruct);
        assert!(err.to_string().contains("internally tagged"));
    }

    #[test]
    fn untagged_struct_variants_fail_with_a_clear_error() {
        #[derive(Debug, Serialize, Deserialize)]
        #[serde(untagged)]
        enum Reply {
            Point { x: i32, y: i32 },
        }

        let bytes = to_vec(&vec![Reply::Point { x: 1, y: 2 }]).unwrap();
        assert_eq!(
            from_slice::<Vec<Reply>>(&bytes).unwrap_err(),
            ThriftError::UntypedStruct
        );
    }

    #[test]
    fn type_mismatch_is_reported() {
        let bytes = to_vec(&account()).unwrap();
        assert!(from_slice::<Vec<String>>(&bytes).is_err());
    }
}
