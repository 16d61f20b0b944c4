// Record Codec
//
// Fixed-width binary layout of a record, one field after another in column
// order:
//
//   INT         4 bytes, big-endian i32
//   FLOAT       4 bytes, big-endian IEEE-754 single
//   CHAR(T)     T UTF-16 units, null padded
//   VARCHAR(T)  4-byte length L, then T UTF-16 units of which the first L count

use byteorder::{BigEndian, ByteOrder};

use crate::catalog::{ColumnInfo, ColumnType, Record, SchemaError};
use crate::catalog::schema::CHAR_UNIT_SIZE;
use crate::relation::error::{RelationError, Result};

#[derive(Debug, Clone)]
pub struct RecordCodec {
    columns: Vec<ColumnInfo>,
    record_size: usize,
}

impl RecordCodec {
    pub fn new(columns: Vec<ColumnInfo>) -> std::result::Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::NoColumns);
        }
        let record_size = columns.iter().map(ColumnInfo::size_in_bytes).sum();
        Ok(Self { columns, record_size })
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Width of an encoded record
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Encode a record into a fresh buffer of `record_size` bytes.
    /// Nothing is returned unless every field is valid.
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>> {
        if record.len() != self.columns.len() {
            return Err(RelationError::ArityMismatch {
                expected: self.columns.len(),
                actual: record.len(),
            });
        }

        let mut buf = vec![0u8; self.record_size];
        let mut pos = 0;
        for (column, value) in self.columns.iter().zip(record.values()) {
            let width = column.size_in_bytes();
            encode_field(column, value, &mut buf[pos..pos + width])?;
            pos += width;
        }
        Ok(buf)
    }

    /// Decode a record from the first `record_size` bytes of `bytes`
    pub fn decode(&self, bytes: &[u8]) -> Record {
        let mut values = Vec::with_capacity(self.columns.len());
        let mut pos = 0;
        for column in &self.columns {
            let width = column.size_in_bytes();
            values.push(decode_field(column, &bytes[pos..pos + width]));
            pos += width;
        }
        Record::new(values)
    }
}

fn invalid(column: &ColumnInfo, value: &str, reason: impl ToString) -> RelationError {
    RelationError::InvalidValue {
        column: column.name().to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn encode_field(column: &ColumnInfo, value: &str, out: &mut [u8]) -> Result<()> {
    match column.column_type() {
        ColumnType::Int => {
            let v: i32 = value.trim().parse().map_err(|e| invalid(column, value, e))?;
            BigEndian::write_i32(out, v);
        }
        ColumnType::Float => {
            let v: f32 = value.trim().parse().map_err(|e| invalid(column, value, e))?;
            BigEndian::write_f32(out, v);
        }
        ColumnType::Char => {
            write_units(value, column.length(), out);
        }
        ColumnType::Varchar => {
            let len = write_units(value, column.length(), &mut out[4..]);
            BigEndian::write_i32(&mut out[..4], len as i32);
        }
    }
    Ok(())
}

/// Write at most `max_units` UTF-16 units of `value`, null padding the rest.
/// Returns the number of units written.
fn write_units(value: &str, max_units: usize, out: &mut [u8]) -> usize {
    out[..max_units * CHAR_UNIT_SIZE].fill(0);
    let mut written = 0;
    for (i, unit) in value.encode_utf16().take(max_units).enumerate() {
        BigEndian::write_u16(&mut out[i * CHAR_UNIT_SIZE..], unit);
        written += 1;
    }
    written
}

fn read_units(bytes: &[u8], count: usize) -> impl Iterator<Item = u16> + '_ {
    bytes
        .chunks_exact(CHAR_UNIT_SIZE)
        .take(count)
        .map(BigEndian::read_u16)
}

fn decode_field(column: &ColumnInfo, bytes: &[u8]) -> String {
    match column.column_type() {
        ColumnType::Int => BigEndian::read_i32(bytes).to_string(),
        ColumnType::Float => format!("{:?}", BigEndian::read_f32(bytes)),
        ColumnType::Char => {
            let units: Vec<u16> = read_units(bytes, column.length())
                .take_while(|&u| u != 0)
                .collect();
            String::from_utf16_lossy(&units)
        }
        ColumnType::Varchar => {
            let len = BigEndian::read_i32(&bytes[..4]).clamp(0, column.length() as i32) as usize;
            let units: Vec<u16> = read_units(&bytes[4..], len).collect();
            String::from_utf16_lossy(&units)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(columns: Vec<ColumnInfo>) -> RecordCodec {
        RecordCodec::new(columns).unwrap()
    }

    #[test]
    fn test_mixed_record_round_trip() {
        let codec = codec(vec![
            ColumnInfo::int("id").unwrap(),
            ColumnInfo::float("val").unwrap(),
            ColumnInfo::char("c", 3).unwrap(),
            ColumnInfo::varchar("v", 6).unwrap(),
        ]);
        assert_eq!(codec.record_size(), 4 + 4 + 6 + 16);

        let bytes = codec
            .encode(&Record::from_values(["123", "3.14", "AB", "Hello"]))
            .unwrap();
        let record = codec.decode(&bytes);

        assert_eq!(record.get(0), Some("123"));
        let val: f32 = record.get(1).unwrap().parse().unwrap();
        assert_eq!(val, "3.14".parse::<f32>().unwrap());
        assert_eq!(record.get(2), Some("AB"));
        assert_eq!(record.get(3), Some("Hello"));
    }

    #[test]
    fn test_char_truncates_and_hides_padding() {
        let codec = codec(vec![ColumnInfo::char("c", 4).unwrap()]);

        let long = codec.encode(&Record::from_values(["ABCDEFG"])).unwrap();
        assert_eq!(codec.decode(&long).get(0), Some("ABCD"));

        let short = codec.encode(&Record::from_values(["Z"])).unwrap();
        assert_eq!(short, vec![0, b'Z', 0, 0, 0, 0, 0, 0]);
        assert_eq!(codec.decode(&short).get(0), Some("Z"));
    }

    #[test]
    fn test_varchar_clamps_length() {
        let codec = codec(vec![ColumnInfo::varchar("v", 5).unwrap()]);

        let bytes = codec.encode(&Record::from_values(["WORLD!!"])).unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 5]);
        assert_eq!(codec.decode(&bytes).get(0), Some("WORLD"));
    }

    #[test]
    fn test_varchar_decode_clamps_corrupt_length() {
        let codec = codec(vec![ColumnInfo::varchar("v", 2).unwrap()]);
        let mut bytes = codec.encode(&Record::from_values(["hi"])).unwrap();

        BigEndian::write_i32(&mut bytes[..4], 99);
        assert_eq!(codec.decode(&bytes).get(0), Some("hi"));

        BigEndian::write_i32(&mut bytes[..4], -3);
        assert_eq!(codec.decode(&bytes).get(0), Some(""));
    }

    #[test]
    fn test_int_is_big_endian() {
        let codec = codec(vec![ColumnInfo::int("id").unwrap()]);
        let bytes = codec.encode(&Record::from_values(["258"])).unwrap();
        assert_eq!(bytes, vec![0, 0, 1, 2]);
        let negative = codec.encode(&Record::from_values([" -1 "])).unwrap();
        assert_eq!(codec.decode(&negative).get(0), Some("-1"));
    }

    #[test]
    fn test_rejects_bad_input() {
        let codec = codec(vec![
            ColumnInfo::int("id").unwrap(),
            ColumnInfo::float("val").unwrap(),
        ]);

        assert!(matches!(
            codec.encode(&Record::from_values(["1"])),
            Err(RelationError::ArityMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            codec.encode(&Record::from_values(["one", "1.0"])),
            Err(RelationError::InvalidValue { .. })
        ));
        assert!(matches!(
            codec.encode(&Record::from_values(["1", "x"])),
            Err(RelationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_empty_schema_rejected() {
        assert!(matches!(RecordCodec::new(Vec::new()), Err(SchemaError::NoColumns)));
    }
}
