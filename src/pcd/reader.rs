use std::fmt::Debug;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;

use crate::pcd::data_types::{Encoding, FieldType, PcdField, PcdHeader, PcdVersion, PointCloud};

type Result<T> = std::result::Result<T, PcdError>;

/// Reads a [PointCloud] directly from a file given the path
pub fn read_pcd_file<P: AsRef<Path>>(p: P) -> Result<PointCloud> {
    let file = File::open(p).map_err(PcdError::Io)?;
    let reader = BufReader::new(file);
    Parser::new(reader).parse()
}

/// Reads only the [PcdHeader] of a file given the path
pub fn read_pcd_header<P: AsRef<Path>>(p: P) -> Result<PcdHeader> {
    let file = File::open(p).map_err(PcdError::Io)?;
    let reader = BufReader::new(file);
    Parser::new(reader).parse_header()
}

/// Parses a [PointCloud] from the reader
/// ```no_run
/// use pcd2csv::pcd::{read_pcd, PcdError};
///
/// fn main() -> Result<(), PcdError> {
///     let cloud = read_pcd("VERSION .7 ...".as_bytes())?;
///     println!("{}", cloud.len());
///     Ok(())
/// }
/// ```
pub fn read_pcd<R: Read>(r: R) -> Result<PointCloud> {
    let reader = BufReader::new(r);
    Parser::new(reader).parse()
}

/// Represents possible error scenarios when decoding a point cloud data file.
#[derive(Error, Debug)]
pub enum PcdError {
    /// The input could not be read at all.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Represents a malformed or unsupported header.
    #[error("Invalid header while parsing {section:?}. {message}\n\t{line:?}")]
    Format {
        /// The portion of the header where the error is encountered
        section: String,
        /// A custom error message describing the error
        message: String,
        /// The line which caused the error
        line: String,
    },
    /// Represents truncated or mistyped body data.
    #[error("Invalid data: {0}")]
    Decode(String),
}

struct Parser<R: BufRead> {
    reader: R,
    line: String,
}

impl<R: BufRead> Parser<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }

    fn parse(mut self) -> Result<PointCloud> {
        let header = self.parse_header()?;
        self.parse_body(header)
    }

    fn parse_header(&mut self) -> Result<PcdHeader> {
        let version = self.parse_version()?;
        let fields = self.parse_fields()?;
        let (width, height) = self.parse_width_and_height()?;
        let viewpoint = self.parse_viewpoint()?;
        let points = self.parse_points()?;
        let encoding = self.parse_encoding()?;

        PcdHeader::new(version, fields, width, height, viewpoint, points, encoding)
            .map_err(|s| self.format_err("", s))
    }

    fn parse_version(&mut self) -> Result<PcdVersion> {
        self.next_line()?;
        let version_str = self.strip_line_prefix("VERSION")?;
        match PcdVersion::from_str(version_str) {
            Ok(PcdVersion::V0_6) => {
                Err(self.format_err("VERSION", "Version 0.6 is not supported".to_string()))
            }
            Ok(PcdVersion::V0_7) => Ok(PcdVersion::V0_7),
            Err(s) => Err(self.format_err("VERSION", s)),
        }
    }

    fn parse_fields(&mut self) -> Result<Vec<PcdField>> {
        let names = self.parse_vec::<String>("FIELDS")?;

        let sizes = self.parse_vec::<u8>("SIZE")?;
        if sizes.len() != names.len() {
            return Err(self.format_err(
                "SIZE",
                format!("Expected length {}, got {}", names.len(), sizes.len()),
            ));
        }

        let types = self.parse_vec::<FieldType>("TYPE")?;
        if types.len() != names.len() {
            return Err(self.format_err(
                "TYPE",
                format!("Expected length {}, got {}", names.len(), types.len()),
            ));
        }

        let counts = self.parse_vec::<u64>("COUNT")?;
        if counts.len() != names.len() {
            return Err(self.format_err(
                "COUNT",
                format!("Expected length {}, got {}", names.len(), counts.len()),
            ));
        }

        let mut fields = Vec::with_capacity(names.len());
        for (i, name) in names.into_iter().enumerate() {
            let field = PcdField::new(name, types[i], sizes[i], counts[i])
                .map_err(|s| self.format_err("", s))?;
            fields.push(field);
        }

        Ok(fields)
    }

    fn parse_vec<T>(&mut self, prefix: &str) -> Result<Vec<T>>
    where
        T: FromStr,
        <T as FromStr>::Err: Debug,
    {
        self.next_line()?;
        self.strip_line_prefix(prefix)?
            .split_whitespace()
            .map(|s| s.parse::<T>())
            .collect::<std::result::Result<Vec<T>, T::Err>>()
            .map_err(|e| self.format_err(prefix, format!("{e:?}")))
    }

    fn parse_width_and_height(&mut self) -> Result<(u64, u64)> {
        self.next_line()?;
        let width = self
            .strip_line_prefix("WIDTH")?
            .parse::<u64>()
            .map_err(|e| self.format_err("WIDTH", e.to_string()))?;

        self.next_line()?;
        let height = self
            .strip_line_prefix("HEIGHT")?
            .parse::<u64>()
            .map_err(|e| self.format_err("HEIGHT", e.to_string()))?;

        Ok((width, height))
    }

    fn parse_viewpoint(&mut self) -> Result<[f32; 7]> {
        self.parse_vec::<f32>("VIEWPOINT")?
            .try_into()
            .map_err(|v: Vec<f32>| {
                self.format_err("VIEWPOINT", format!("Expected length 7, got {}", v.len()))
            })
    }

    fn parse_points(&mut self) -> Result<u64> {
        self.next_line()?;
        self.strip_line_prefix("POINTS")?
            .parse::<u64>()
            .map_err(|e| self.format_err("POINTS", e.to_string()))
    }

    fn parse_encoding(&mut self) -> Result<Encoding> {
        self.next_line()?;
        self.strip_line_prefix("DATA")?
            .parse::<Encoding>()
            .map_err(|e| self.format_err("DATA", e))
    }

    fn parse_body(self, header: PcdHeader) -> Result<PointCloud> {
        match header.encoding() {
            Encoding::Ascii => self.parse_ascii_body(header),
            Encoding::Binary => self.parse_binary_body(header),
            Encoding::BinaryCompressed => self.parse_compressed_body(header),
        }
    }

    fn parse_ascii_body(self, header: PcdHeader) -> Result<PointCloud> {
        let mut buffer = Vec::with_capacity(header.buffer_size() as usize);
        let values_per_line = header.values_per_point();

        let mut lines = self.reader.lines();
        let mut parsed: u64 = 0;
        while parsed < header.points() {
            let line = match lines.next() {
                Some(line) => line.map_err(PcdError::Io)?,
                None => {
                    return Err(PcdError::Decode(format!(
                        "Expected {} points, body ended after {}",
                        header.points(),
                        parsed
                    )))
                }
            };
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let tokens = line.split_whitespace().collect::<Vec<&str>>();
            if tokens.len() as u64 != values_per_line {
                return Err(PcdError::Decode(format!(
                    "Expected {} values per line, got {}.\nLine: {}",
                    values_per_line,
                    tokens.len(),
                    line
                )));
            }

            let mut index = 0;
            for field in header.fields() {
                for _ in 0..field.count() {
                    field
                        .scalar_type()
                        .encode_token(tokens[index], &mut buffer)
                        .map_err(PcdError::Decode)?;
                    index += 1;
                }
            }
            parsed += 1;
        }

        PointCloud::new(header, buffer).map_err(PcdError::Decode)
    }

    fn parse_binary_body(mut self, header: PcdHeader) -> Result<PointCloud> {
        let expected = header.buffer_size() as usize;
        let mut buffer = Vec::with_capacity(expected);
        self.reader
            .read_to_end(&mut buffer)
            .map_err(PcdError::Io)?;
        if buffer.len() < expected {
            return Err(PcdError::Decode(format!(
                "Expected {} bytes of point data, got {}",
                expected,
                buffer.len()
            )));
        }
        // Trailing bytes past the declared point count are ignored.
        buffer.truncate(expected);
        PointCloud::new(header, buffer).map_err(PcdError::Decode)
    }

    /// The compressed body is an 8-byte prelude (compressed and decompressed
    /// sizes, both u32 little endian) followed by the LZF stream. The
    /// decompressed buffer holds whole columns (all values of the first
    /// field, then the second, ...) and must be transposed back into
    /// point-major records.
    fn parse_compressed_body(mut self, header: PcdHeader) -> Result<PointCloud> {
        let compressed_size = self.reader.read_u32::<LittleEndian>().map_err(|_| {
            PcdError::Decode("Compressed body ended before the size prelude".to_string())
        })? as usize;
        let decompressed_size = self.reader.read_u32::<LittleEndian>().map_err(|_| {
            PcdError::Decode("Compressed body ended before the size prelude".to_string())
        })? as usize;

        if decompressed_size as u64 != header.buffer_size() {
            return Err(PcdError::Decode(format!(
                "Compressed prelude declares {} decompressed bytes, header requires {}",
                decompressed_size,
                header.buffer_size()
            )));
        }

        let mut compressed = vec![0; compressed_size];
        self.reader.read_exact(&mut compressed).map_err(|_| {
            PcdError::Decode(format!(
                "Expected {compressed_size} bytes of compressed point data"
            ))
        })?;

        let columns = lzf::decompress(&compressed, decompressed_size)
            .map_err(|e| PcdError::Decode(format!("LZF decompression failed: {e:?}")))?;
        if columns.len() != decompressed_size {
            return Err(PcdError::Decode(format!(
                "Expected {} decompressed bytes, got {}",
                decompressed_size,
                columns.len()
            )));
        }

        let buffer = transpose_columns(&header, &columns);
        PointCloud::new(header, buffer).map_err(PcdError::Decode)
    }

    fn strip_line_prefix(&mut self, prefix: &str) -> Result<&str> {
        self.line
            .trim()
            .strip_prefix(prefix)
            .ok_or_else(|| {
                self.format_err(prefix, format!("Expected line to start with {prefix}"))
            })
            .map(|s| s.trim())
    }

    fn next_line(&mut self) -> Result<()> {
        loop {
            self.line.clear();
            let read = self.reader.read_line(&mut self.line).map_err(PcdError::Io)?;
            if read == 0 {
                return Err(self.format_err(
                    "",
                    "Unexpected end of file before the DATA line".to_string(),
                ));
            }
            if self.line.starts_with('#') || self.line.trim().is_empty() {
                continue;
            }
            return Ok(());
        }
    }

    fn format_err(&self, section: &str, message: String) -> PcdError {
        PcdError::Format {
            section: section.to_string(),
            message,
            line: self.line.clone(),
        }
    }
}

fn transpose_columns(header: &PcdHeader, columns: &[u8]) -> Vec<u8> {
    let points = header.points() as usize;
    let stride = header.point_stride() as usize;
    let mut records = vec![0u8; columns.len()];
    let mut column_start = 0;
    let mut field_offset = 0;
    for field in header.fields() {
        let width = field.scalar_type().size() as usize * field.count() as usize;
        for point in 0..points {
            let src = column_start + point * width;
            let dst = point * stride + field_offset;
            records[dst..dst + width].copy_from_slice(&columns[src..src + width]);
        }
        column_start += points * width;
        field_offset += width;
    }
    records
}

#[cfg(test)]
mod tests {
    use byteorder::{NativeEndian, WriteBytesExt};
    use std::io::BufReader;

    use crate::pcd::data_types::{
        Encoding, FieldType, PcdField, PcdHeader, PcdVersion, Scalar,
    };
    use crate::pcd::reader::{read_pcd, Parser, PcdError};

    fn expected_header() -> PcdHeader {
        PcdHeader::new(
            PcdVersion::V0_7,
            vec![
                PcdField::new("x".to_string(), FieldType::Float, 4, 1).unwrap(),
                PcdField::new("y".to_string(), FieldType::Float, 4, 1).unwrap(),
                PcdField::new("z".to_string(), FieldType::Float, 4, 1).unwrap(),
                PcdField::new("intensity".to_string(), FieldType::Float, 4, 1).unwrap(),
            ],
            2,
            1,
            [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            2,
            Encoding::Ascii,
        )
        .unwrap()
    }

    fn header_str(encoding: &str) -> String {
        format!(
            "VERSION .7\n\
             FIELDS x y z intensity\n\
             SIZE 4 4 4 4\n\
             TYPE F F F F\n\
             COUNT 1 1 1 1\n\
             WIDTH 2\n\
             HEIGHT 1\n\
             VIEWPOINT 0 0 0 1 0 0 0\n\
             POINTS 2\n\
             DATA {encoding}\n"
        )
    }

    fn parse_str(s: &str) -> Parser<BufReader<&[u8]>> {
        Parser::new(BufReader::new(s.as_bytes()))
    }

    fn assert_format_fail<T: std::fmt::Debug>(
        result: Result<T, PcdError>,
        fail_section: &str,
    ) {
        match result {
            Ok(_) => panic!("Parsing should fail"),
            Err(e) => match e {
                PcdError::Format { section, .. } => assert_eq!(&section, fail_section),
                _ => panic!("Error should be due to {fail_section}"),
            },
        }
    }

    #[test]
    fn parse_version_success() {
        for version in ["VERSION .7", "VERSION 0.7"] {
            let mut parser = parse_str(version);
            assert_eq!(parser.parse_version().unwrap(), PcdVersion::V0_7);
        }
    }

    #[test]
    fn parse_version_fail() {
        let versions = [
            "VERSION .6",
            "VERSION 0.6",
            "Version .7",
            "VERSION 7",
            "ImNotEvenAVersion 0.7",
        ];

        for version in versions {
            let mut parser = parse_str(version);
            assert_format_fail(parser.parse_version(), "VERSION");
        }
    }

    #[test]
    fn parse_fields_success() {
        let fields = "FIELDS x y z rgba\n\
             SIZE 1 2 4 8\n\
             TYPE I U U F\n\
             COUNT 1 2 3 4";

        let expected = [
            PcdField::new("x".to_string(), FieldType::Signed, 1, 1).unwrap(),
            PcdField::new("y".to_string(), FieldType::Unsigned, 2, 2).unwrap(),
            PcdField::new("z".to_string(), FieldType::Unsigned, 4, 3).unwrap(),
            PcdField::new("rgba".to_string(), FieldType::Float, 8, 4).unwrap(),
        ];

        let mut parser = parse_str(fields);
        assert_eq!(parser.parse_fields().unwrap(), expected);
    }

    #[test]
    fn parse_fields_failure() {
        let fields = "NOTFIELD x y z rgba\n\
             SIZE 1 2 4 8\n\
             TYPE I U U F\n\
             COUNT 1 2 3 4";

        let mut parser = parse_str(fields);
        assert_format_fail(parser.parse_fields(), "FIELDS");
    }

    #[test]
    fn parse_fields_invalid_size() {
        let fields = "FIELDS x y z rgba\n\
             SIZE 3 2 4 8\n\
             TYPE I U U F\n\
             COUNT 1 2 3 4";

        let mut parser = parse_str(fields);
        assert_format_fail(parser.parse_fields(), "");
    }

    #[test]
    fn parse_fields_invalid_type() {
        let fields = "FIELDS x y z rgba\n\
             SIZE 1 2 4 8\n\
             TYPE I A U F\n\
             COUNT 1 2 3 4";

        let mut parser = parse_str(fields);
        assert_format_fail(parser.parse_fields(), "TYPE");
    }

    #[test]
    fn parse_fields_length_mismatches() {
        let cases = [
            (
                "FIELDS x y z rgba\nSIZE 1 2 4 8 1\nTYPE I U U F\nCOUNT 1 2 3 4",
                "SIZE",
            ),
            (
                "FIELDS x y z rgba\nSIZE 1 2 4 8\nTYPE I U U F I\nCOUNT 1 2 3 4",
                "TYPE",
            ),
            (
                "FIELDS x y z rgba\nSIZE 1 2 4 8\nTYPE I U U F\nCOUNT 1 2 3 4 1",
                "COUNT",
            ),
        ];

        for (fields, section) in cases {
            let mut parser = parse_str(fields);
            assert_format_fail(parser.parse_fields(), section);
        }
    }

    #[test]
    fn parse_fields_invalid_size_and_type() {
        let fields_to_test = [
            "FIELDS x\nSIZE 1\nTYPE F\nCOUNT 1",
            "FIELDS x\nSIZE 2\nTYPE F\nCOUNT 1",
            "FIELDS x\nSIZE 16\nTYPE U\nCOUNT 1",
        ];

        for fields in fields_to_test {
            let mut parser = parse_str(fields);
            assert_format_fail(parser.parse_fields(), "");
        }
    }

    #[test]
    fn parse_width_and_height_success() {
        let mut parser = parse_str("WIDTH 640\nHEIGHT 320");
        assert_eq!(parser.parse_width_and_height().unwrap(), (640, 320));
    }

    #[test]
    fn parse_width_failure() {
        for s in ["NOTWIDTH 640\nHEIGHT 320", "WIDTH 6.40\nHEIGHT 320"] {
            let mut parser = parse_str(s);
            assert_format_fail(parser.parse_width_and_height(), "WIDTH");
        }
    }

    #[test]
    fn parse_height_failure() {
        for s in ["WIDTH 640\nNOTHEIGHT 320", "WIDTH 640\nHEIGHT abc"] {
            let mut parser = parse_str(s);
            assert_format_fail(parser.parse_width_and_height(), "HEIGHT");
        }
    }

    #[test]
    fn parse_viewpoint_success() {
        let mut parser = parse_str("VIEWPOINT 0.1 0 0 1 0 0 0");
        assert_eq!(
            parser.parse_viewpoint().unwrap(),
            [0.1, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn parse_viewpoint_failure() {
        let viewpoints = [
            "NOTVIEWPOINT 0.1 0 0 1 0 0 0",
            "VIEWPOINT a 0 0 1 0 0 0",
            "VIEWPOINT 0.1 0 0 1 0 0 0 1",
        ];

        for s in viewpoints {
            let mut parser = parse_str(s);
            assert_format_fail(parser.parse_viewpoint(), "VIEWPOINT");
        }
    }

    #[test]
    fn parse_points_success() {
        let mut parser = parse_str("POINTS 307200");
        assert_eq!(parser.parse_points().unwrap(), 307200);
    }

    #[test]
    fn parse_points_failure() {
        for s in ["NOTPOINTS 307200", "POINTS 30.2", "POINTS abc"] {
            let mut parser = parse_str(s);
            assert_format_fail(parser.parse_points(), "POINTS");
        }
    }

    #[test]
    fn parse_header_success() {
        let binding = header_str("ascii");
        let mut parser = parse_str(&binding);
        assert_eq!(parser.parse_header().unwrap(), expected_header());
    }

    #[test]
    fn parse_header_with_comments_success() {
        let header = "# This is a point cloud file\n\
               VERSION .7\n\
               # I am a comment\n\
               FIELDS x y z intensity\n\
               SIZE 4 4 4 4\n\
               # I am another comment\n\
               TYPE F F F F\n\
               COUNT 1 1 1 1\n\
               WIDTH 2\n\
               HEIGHT 1\n\
               VIEWPOINT 0 0 0 1 0 0 0\n\
               POINTS 2\n\
               DATA ascii\n";

        let mut parser = parse_str(header);
        assert_eq!(parser.parse_header().unwrap(), expected_header());
    }

    #[test]
    fn parse_header_missing_data_line() {
        let header = "VERSION .7\n\
               FIELDS x y z intensity\n\
               SIZE 4 4 4 4\n\
               TYPE F F F F\n\
               COUNT 1 1 1 1\n\
               WIDTH 2\n\
               HEIGHT 1\n\
               VIEWPOINT 0 0 0 1 0 0 0\n\
               POINTS 2\n";

        let mut parser = parse_str(header);
        assert_format_fail(parser.parse_header(), "");
    }

    #[test]
    fn parse_ascii_success() {
        let pcd = header_str("ascii") + "1.0 2.0 3.0 100\n4.0 5.0 6.0 200\n";
        let cloud = read_pcd(pcd.as_bytes()).unwrap();
        assert_eq!(cloud.header(), &expected_header());
        let rows: Vec<Vec<Scalar>> = cloud.rows().collect();
        assert_eq!(
            rows,
            vec![
                vec![
                    Scalar::F32(1.0),
                    Scalar::F32(2.0),
                    Scalar::F32(3.0),
                    Scalar::F32(100.0),
                ],
                vec![
                    Scalar::F32(4.0),
                    Scalar::F32(5.0),
                    Scalar::F32(6.0),
                    Scalar::F32(200.0),
                ],
            ]
        );
    }

    #[test]
    fn parse_ascii_truncated() {
        let pcd = header_str("ascii") + "1.0 2.0 3.0 100\n";
        match read_pcd(pcd.as_bytes()) {
            Err(PcdError::Decode(_)) => {}
            other => panic!("Expected a decode error, got {other:?}"),
        }
    }

    #[test]
    fn parse_ascii_wrong_token_count() {
        let pcd = header_str("ascii") + "1.0 2.0 3.0\n4.0 5.0 6.0\n";
        match read_pcd(pcd.as_bytes()) {
            Err(PcdError::Decode(_)) => {}
            other => panic!("Expected a decode error, got {other:?}"),
        }
    }

    #[test]
    fn parse_ascii_mistyped_token() {
        let pcd = "VERSION .7\n\
             FIELDS label\n\
             SIZE 2\n\
             TYPE U\n\
             COUNT 1\n\
             WIDTH 1\n\
             HEIGHT 1\n\
             VIEWPOINT 0 0 0 1 0 0 0\n\
             POINTS 1\n\
             DATA ascii\n\
             -3\n";
        match read_pcd(pcd.as_bytes()) {
            Err(PcdError::Decode(_)) => {}
            other => panic!("Expected a decode error, got {other:?}"),
        }
    }

    fn binary_body() -> Vec<u8> {
        let mut body = vec![];
        for value in [1.0f32, 2.0, 3.0, 100.0, 4.0, 5.0, 6.0, 200.0] {
            body.write_f32::<NativeEndian>(value).unwrap();
        }
        body
    }

    #[test]
    fn parse_binary_success() {
        let mut pcd = header_str("binary").into_bytes();
        pcd.extend_from_slice(&binary_body());

        let cloud = read_pcd(&pcd[..]).unwrap();
        assert_eq!(cloud.len(), 2);
        let first = cloud.rows().next().unwrap();
        assert_eq!(
            first,
            vec![
                Scalar::F32(1.0),
                Scalar::F32(2.0),
                Scalar::F32(3.0),
                Scalar::F32(100.0),
            ]
        );
    }

    #[test]
    fn parse_binary_truncated() {
        let mut pcd = header_str("binary").into_bytes();
        let body = binary_body();
        pcd.extend_from_slice(&body[..body.len() - 5]);

        match read_pcd(&pcd[..]) {
            Err(PcdError::Decode(_)) => {}
            other => panic!("Expected a decode error, got {other:?}"),
        }
    }

    #[test]
    fn parse_binary_compressed_success() {
        let points = 32u32;
        // Column-major layout, as the writer stores it: x of every point
        // first, then the ring index of every point.
        let mut columns = vec![];
        for point in 0..points {
            columns
                .write_f32::<NativeEndian>((point % 4) as f32)
                .unwrap();
        }
        for point in 0..points {
            columns.push(point as u8);
        }
        let compressed = lzf::compress(&columns).unwrap();

        let header = format!(
            "VERSION .7\n\
             FIELDS x ring\n\
             SIZE 4 1\n\
             TYPE F U\n\
             COUNT 1 1\n\
             WIDTH {points}\n\
             HEIGHT 1\n\
             VIEWPOINT 0 0 0 1 0 0 0\n\
             POINTS {points}\n\
             DATA binary_compressed\n"
        );
        let mut pcd = header.into_bytes();
        pcd.write_u32::<byteorder::LittleEndian>(compressed.len() as u32)
            .unwrap();
        pcd.write_u32::<byteorder::LittleEndian>(columns.len() as u32)
            .unwrap();
        pcd.extend_from_slice(&compressed);

        let cloud = read_pcd(&pcd[..]).unwrap();
        let rows: Vec<Vec<Scalar>> = cloud.rows().collect();
        assert_eq!(rows.len(), points as usize);
        for (point, row) in rows.iter().enumerate() {
            assert_eq!(
                row,
                &vec![
                    Scalar::F32((point % 4) as f32),
                    Scalar::Unsigned(point as u64),
                ]
            );
        }
    }

    #[test]
    fn parse_binary_compressed_truncated_prelude() {
        let mut pcd = header_str("binary_compressed").into_bytes();
        pcd.extend_from_slice(&[1, 0]);

        match read_pcd(&pcd[..]) {
            Err(PcdError::Decode(_)) => {}
            other => panic!("Expected a decode error, got {other:?}"),
        }
    }

    #[test]
    fn parse_binary_compressed_size_mismatch() {
        let mut pcd = header_str("binary_compressed").into_bytes();
        pcd.write_u32::<byteorder::LittleEndian>(4).unwrap();
        // Prelude disagrees with stride * POINTS from the header.
        pcd.write_u32::<byteorder::LittleEndian>(12).unwrap();
        pcd.extend_from_slice(&[0, 0, 0, 0]);

        match read_pcd(&pcd[..]) {
            Err(PcdError::Decode(_)) => {}
            other => panic!("Expected a decode error, got {other:?}"),
        }
    }

    #[test]
    fn binary_matches_ascii() {
        let ascii = header_str("ascii") + "1.0 2.0 3.0 100\n4.0 5.0 6.0 200\n";
        let ascii_cloud = read_pcd(ascii.as_bytes()).unwrap();

        let mut binary = header_str("binary").into_bytes();
        binary.extend_from_slice(&binary_body());
        let binary_cloud = read_pcd(&binary[..]).unwrap();

        assert_eq!(ascii_cloud.data(), binary_cloud.data());
    }
}
