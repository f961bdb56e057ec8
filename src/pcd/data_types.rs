use std::convert::TryFrom;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;

use byteorder::{ByteOrder, NativeEndian, WriteBytesExt};
use serde::{Serialize, Serializer};

/// A fully decoded .pcd file: the header plus every point record as one
/// contiguous native-endian buffer of `point_stride() * points` bytes.
pub struct PointCloud {
    header: PcdHeader,
    data: Vec<u8>,
}

impl PointCloud {
    pub fn new(header: PcdHeader, data: Vec<u8>) -> Result<Self, String> {
        if header.buffer_size() != data.len() as u64 {
            Err(format!(
                "Expected {} bytes of point data from header, got {} instead",
                header.buffer_size(),
                data.len()
            ))
        } else {
            Ok(Self { header, data })
        }
    }

    pub fn header(&self) -> &PcdHeader {
        &self.header
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of points in the cloud.
    pub fn len(&self) -> usize {
        self.header.points() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the point records in declaration order, yielding one
    /// decoded [Scalar] per declared field element.
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            cloud: self,
            offset: 0,
            remaining: self.header.points(),
        }
    }
}

impl Debug for PointCloud {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PointCloud: {:?}", self.header)
    }
}

/// Iterator over decoded point records, created by [PointCloud::rows].
pub struct Rows<'a> {
    cloud: &'a PointCloud,
    offset: usize,
    remaining: u64,
}

impl<'a> Iterator for Rows<'a> {
    type Item = Vec<Scalar>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let cloud = self.cloud;
        let mut row = Vec::with_capacity(cloud.header.values_per_point() as usize);
        for field in cloud.header.fields() {
            for _ in 0..field.count() {
                let size = field.scalar_type().size() as usize;
                let value = field
                    .scalar_type()
                    .read(&cloud.data[self.offset..self.offset + size]);
                row.push(value);
                self.offset += size;
            }
        }
        Some(row)
    }
}

/// Header information of a .pcd file
#[derive(Debug, Clone, PartialEq)]
pub struct PcdHeader {
    version: PcdVersion,
    fields: Vec<PcdField>,
    width: u64,
    height: u64,
    viewpoint: [f32; 7],
    points: u64,
    encoding: Encoding,
}

impl PcdHeader {
    pub fn new(
        version: PcdVersion,
        fields: Vec<PcdField>,
        width: u64,
        height: u64,
        viewpoint: [f32; 7],
        points: u64,
        encoding: Encoding,
    ) -> Result<Self, String> {
        if width.saturating_mul(height) != points {
            return Err(format!("Width * Height must be equal to number of points. Width: {width} Height: {height} Points: {points}"));
        }

        Ok(Self {
            version,
            fields,
            width,
            height,
            viewpoint,
            points,
            encoding,
        })
    }

    pub fn version(&self) -> PcdVersion {
        self.version
    }

    pub fn fields(&self) -> &Vec<PcdField> {
        &self.fields
    }

    pub fn width(&self) -> u64 {
        self.width
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn viewpoint(&self) -> &[f32; 7] {
        &self.viewpoint
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Byte length of one point record under binary encoding.
    pub fn point_stride(&self) -> u64 {
        self.fields
            .iter()
            .map(|field| field.scalar_type().size() as u64 * field.count())
            .sum()
    }

    /// Number of bytes the decoded body must contain.
    pub fn buffer_size(&self) -> u64 {
        self.point_stride() * self.points
    }

    /// Number of scalar values per point record; in "ascii" mode this is also
    /// the token count per body line.
    ///
    /// Example: given the following field section:
    ///     FIELDS x y z fpfh
    ///     ...
    ///     COUNT 1 1 1 33
    ///
    /// each line carries 1 + 1 + 1 + 33 = 36 values.
    pub fn values_per_point(&self) -> u64 {
        self.fields.iter().fold(0, |acc, field| acc + field.count)
    }

    /// Column names of the tabular form of this cloud, in header order.
    ///
    /// Fields with COUNT 1 keep their declared name. Larger counts expand to
    /// one column per element (`fpfh__0000`, `fpfh__0001`, ...). Anonymous
    /// padding fields, declared as `_` by the scanner toolchain, are named by
    /// their field position so that column names stay unique and runs stay
    /// reproducible.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.values_per_point() as usize);
        for (index, field) in self.fields.iter().enumerate() {
            let base = if field.name() == "_" {
                format!("_{index:04}")
            } else {
                field.name().to_string()
            };
            if field.count() == 1 {
                columns.push(base);
            } else {
                for element in 0..field.count() {
                    columns.push(format!("{base}__{element:04}"));
                }
            }
        }
        columns
    }
}

/// Version of the PCD file format
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PcdVersion {
    V0_6,
    V0_7,
}

impl FromStr for PcdVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0.6" | ".6" => Ok(Self::V0_6),
            "0.7" | ".7" => Ok(Self::V0_7),
            _ => Err(format!("Version type {s} not supported!")),
        }
    }
}

/// One dimension of a point as declared by the FIELDS/SIZE/TYPE/COUNT lines
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PcdField {
    name: String,
    scalar_type: ScalarType,
    count: u64,
}

impl PcdField {
    pub fn new(name: String, field_type: FieldType, size: u8, count: u64) -> Result<Self, String> {
        if count == 0 {
            return Err(format!("Field {name} declares COUNT 0"));
        }
        let scalar_type = (field_type, size).try_into()?;
        Ok(Self {
            name,
            scalar_type,
            count,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.scalar_type
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// A valid combination of the [FieldType] tag and the declared byte SIZE.
///
/// Certain combinations of size and type have no representation (there is no
/// 2-byte float, for instance); constructing a [ScalarType] guarantees the
/// header declared a decodable one.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScalarType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl TryFrom<(FieldType, u8)> for ScalarType {
    type Error = String;

    fn try_from((field_type, size): (FieldType, u8)) -> Result<Self, Self::Error> {
        use FieldType::*;

        match (field_type, size) {
            (Signed, 1) => Ok(Self::I8),
            (Unsigned, 1) => Ok(Self::U8),
            (Signed, 2) => Ok(Self::I16),
            (Unsigned, 2) => Ok(Self::U16),
            (Signed, 4) => Ok(Self::I32),
            (Unsigned, 4) => Ok(Self::U32),
            (Signed, 8) => Ok(Self::I64),
            (Unsigned, 8) => Ok(Self::U64),
            (Float, 4) => Ok(Self::F32),
            (Float, 8) => Ok(Self::F64),
            _ => Err(format!(
                "Field combination of type: {field_type:?} and size: {size} not supported."
            )),
        }
    }
}

impl ScalarType {
    pub fn size(&self) -> u8 {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Self::U8 | Self::U16 | Self::U32 | Self::U64 => FieldType::Unsigned,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 => FieldType::Signed,
            Self::F32 | Self::F64 => FieldType::Float,
        }
    }

    /// Decodes one value from a native-endian slice of exactly `size()` bytes.
    pub fn read(&self, buf: &[u8]) -> Scalar {
        match self {
            Self::U8 => Scalar::Unsigned(buf[0] as u64),
            Self::I8 => Scalar::Signed(buf[0] as i8 as i64),
            Self::U16 => Scalar::Unsigned(NativeEndian::read_u16(buf) as u64),
            Self::I16 => Scalar::Signed(NativeEndian::read_i16(buf) as i64),
            Self::U32 => Scalar::Unsigned(NativeEndian::read_u32(buf) as u64),
            Self::I32 => Scalar::Signed(NativeEndian::read_i32(buf) as i64),
            Self::U64 => Scalar::Unsigned(NativeEndian::read_u64(buf)),
            Self::I64 => Scalar::Signed(NativeEndian::read_i64(buf)),
            Self::F32 => Scalar::F32(NativeEndian::read_f32(buf)),
            Self::F64 => Scalar::F64(NativeEndian::read_f64(buf)),
        }
    }

    /// Parses one ascii token and appends its native-endian encoding to `out`.
    pub fn encode_token(&self, token: &str, out: &mut Vec<u8>) -> Result<(), String> {
        match self {
            Self::U8 => out.write_u8(
                token
                    .parse::<u8>()
                    .map_err(|e| format!("cannot parse {token:?} as {self:?}: {e}"))?,
            ),
            Self::I8 => out.write_i8(
                token
                    .parse::<i8>()
                    .map_err(|e| format!("cannot parse {token:?} as {self:?}: {e}"))?,
            ),
            Self::U16 => out.write_u16::<NativeEndian>(
                token
                    .parse::<u16>()
                    .map_err(|e| format!("cannot parse {token:?} as {self:?}: {e}"))?,
            ),
            Self::I16 => out.write_i16::<NativeEndian>(
                token
                    .parse::<i16>()
                    .map_err(|e| format!("cannot parse {token:?} as {self:?}: {e}"))?,
            ),
            Self::U32 => out.write_u32::<NativeEndian>(
                token
                    .parse::<u32>()
                    .map_err(|e| format!("cannot parse {token:?} as {self:?}: {e}"))?,
            ),
            Self::I32 => out.write_i32::<NativeEndian>(
                token
                    .parse::<i32>()
                    .map_err(|e| format!("cannot parse {token:?} as {self:?}: {e}"))?,
            ),
            Self::U64 => out.write_u64::<NativeEndian>(
                token
                    .parse::<u64>()
                    .map_err(|e| format!("cannot parse {token:?} as {self:?}: {e}"))?,
            ),
            Self::I64 => out.write_i64::<NativeEndian>(
                token
                    .parse::<i64>()
                    .map_err(|e| format!("cannot parse {token:?} as {self:?}: {e}"))?,
            ),
            Self::F32 => out.write_f32::<NativeEndian>(
                token
                    .parse::<f32>()
                    .map_err(|e| format!("cannot parse {token:?} as {self:?}: {e}"))?,
            ),
            Self::F64 => out.write_f64::<NativeEndian>(
                token
                    .parse::<f64>()
                    .map_err(|e| format!("cannot parse {token:?} as {self:?}: {e}"))?,
            ),
        }
        .unwrap();
        Ok(())
    }
}

/// The TYPE tag of a field dimension
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldType {
    Signed,
    Unsigned,
    Float,
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I" => Ok(Self::Signed),
            "U" => Ok(Self::Unsigned),
            "F" => Ok(Self::Float),
            _ => Err(format!("Unknown field type {s}")),
        }
    }
}

/// The storage mode of the body, declared by the DATA line
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Encoding {
    Ascii,
    Binary,
    BinaryCompressed,
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascii" => Ok(Self::Ascii),
            "binary" => Ok(Self::Binary),
            "binary_compressed" => Ok(Self::BinaryCompressed),
            _ => Err(format!("Unknown data type: {s}")),
        }
    }
}

/// One decoded field value.
///
/// Integers are widened to 64 bits; floats keep their declared width so that
/// their shortest decimal form is the one the sensor wrote.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Scalar {
    Signed(i64),
    Unsigned(u64),
    F32(f32),
    F64(f64),
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Scalar::Signed(v) => serializer.serialize_i64(v),
            Scalar::Unsigned(v) => serializer.serialize_u64(v),
            Scalar::F32(v) => serializer.serialize_f32(v),
            Scalar::F64(v) => serializer.serialize_f64(v),
        }
    }
}
