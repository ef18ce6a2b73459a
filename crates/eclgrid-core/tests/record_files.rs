use eclgrid_core::io::{ElementWidth, Endianness, FortioError, RecordOptions, RecordStream};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use tempfile::TempDir;

fn ints(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_ne_bytes()).collect()
}

fn write_records(path: &Path, opts: RecordOptions, records: &[&[i32]]) {
    let file = File::create(path).expect("file should be created");
    let mut stream = RecordStream::new(file, opts);
    for record in records {
        stream
            .write_record(&ints(record))
            .expect("record should be written");
    }
    stream.flush().expect("file should flush");
}

#[test]
fn integer_records_read_back_in_host_order() {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = temp.path().join("ints.bin");
    let opts = RecordOptions::new(ElementWidth::Four);
    write_records(&path, opts, &[&[1, 2, 3], &[], &[-7]]);
    assert_eq!(
        fs::metadata(&path).expect("metadata").len(),
        (12 + 8) + 8 + (4 + 8)
    );

    let mut stream = RecordStream::new(File::open(&path).expect("file should open"), opts);
    let mut buffer = Vec::new();
    assert_eq!(stream.record_len().expect("length"), 3);
    assert_eq!(stream.read_record(&mut buffer).expect("first record"), 3);
    assert_eq!(buffer, ints(&[1, 2, 3]));
    assert_eq!(stream.skip_record().expect("empty record"), 0);
    assert_eq!(stream.read_record(&mut buffer).expect("last record"), 1);
    assert_eq!(buffer, ints(&[-7]));
    assert!(stream.at_end().expect("end check"));
}

#[test]
fn little_endian_markers_are_honoured() {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = temp.path().join("little.bin");
    let opts = RecordOptions::new(ElementWidth::Eight).with_endianness(Endianness::Little);
    let payload: Vec<u8> = [1.5f64, -2.25]
        .iter()
        .flat_map(|value| value.to_ne_bytes())
        .collect();
    {
        let mut stream = RecordStream::new(File::create(&path).expect("create"), opts);
        stream.write_record(&payload).expect("record should be written");
    }

    let bytes = fs::read(&path).expect("file should be read");
    assert_eq!(&bytes[..4], &16i32.to_le_bytes());

    let mut stream = RecordStream::new(File::open(&path).expect("open"), opts);
    let mut buffer = Vec::new();
    assert_eq!(stream.read_record(&mut buffer).expect("record"), 2);
    assert_eq!(buffer, payload);

    let mut big = RecordStream::new(
        File::open(&path).expect("open"),
        RecordOptions::new(ElementWidth::Eight),
    );
    assert!(big.skip_record().is_err());
    assert_eq!(big.position().expect("position"), 0);
}

#[test]
fn truncated_tail_fails_unless_allowed() {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = temp.path().join("short.bin");
    let opts = RecordOptions::new(ElementWidth::Four);
    write_records(&path, opts, &[&[10], &[20, 30]]);

    let full_len = fs::metadata(&path).expect("metadata").len();
    OpenOptions::new()
        .write(true)
        .open(&path)
        .expect("file should open for writing")
        .set_len(full_len - 2)
        .expect("file should be truncated");

    let mut stream = RecordStream::new(File::open(&path).expect("open"), opts);
    stream.skip_record().expect("first record is intact");
    let offset = stream.position().expect("position");
    let mut buffer = Vec::new();
    let error = stream.read_record(&mut buffer).expect_err("tail is cut short");
    assert!(matches!(error, FortioError::Read { .. }));
    assert_eq!(stream.position().expect("position"), offset);

    stream.set_options(opts.allow_missing_tail());
    assert_eq!(stream.read_record(&mut buffer).expect("tail may be missing"), 2);
    assert_eq!(buffer, ints(&[20, 30]));
}
