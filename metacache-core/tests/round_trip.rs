//! End-to-end properties of the binary codec and the JSON importer.

use metacache_core::{
    decode_from_slice, diff, encode_to_vec, export_json, import_json, CodecConfig,
    ColumnDictionary, ColumnStatistics, ColumnTypeInfo, Header, MetaCacheError, OriginalType,
    ParquetFileMetadata, PrimitiveType, RowGroupMetadata, StatisticValue, TableMetadata,
};
use serde_json::json;
use std::collections::BTreeMap;

const COLUMN_COUNT: usize = 50;

/// 50 columns cycling through every primitive type; `c00`..`c49` so the
/// dotted names sort in creation order.
fn wide_columns() -> Vec<ColumnTypeInfo> {
    (0..COLUMN_COUNT)
        .map(|i| {
            let primitive = PrimitiveType::ALL[i % PrimitiveType::ALL.len()];
            let original = (primitive == PrimitiveType::Binary).then_some(OriginalType::Utf8);
            ColumnTypeInfo::new(vec![format!("c{i:02}")], Some(primitive), original)
        })
        .collect()
}

fn statistic_for(primitive: PrimitiveType, seed: usize) -> StatisticValue {
    match primitive {
        PrimitiveType::Int32 => StatisticValue::Int32(seed as i32 - 5000),
        PrimitiveType::Int64 => StatisticValue::Int64(-(seed as i64) * 1_000_003),
        PrimitiveType::Boolean => StatisticValue::Bool(seed % 2 == 0),
        PrimitiveType::Float => StatisticValue::Float(1.5),
        PrimitiveType::Double => StatisticValue::Double(1.5),
        PrimitiveType::Binary | PrimitiveType::Int96 | PrimitiveType::FixedLenByteArray => {
            StatisticValue::Binary(format!("v{seed}").into_bytes())
        }
    }
}

fn wide_table(files: usize) -> TableMetadata {
    let dictionary = ColumnDictionary::build(wide_columns()).unwrap();

    let files = (0..files)
        .map(|f| {
            let columns = dictionary
                .iter()
                .filter_map(|(id, column)| {
                    let primitive = column.primitive_type.unwrap();
                    let nulls = (f + id as usize) as i64 % 3;
                    let statistic = (id as usize % 7 != 0).then(|| statistic_for(primitive, f));
                    ColumnStatistics::new(id, nulls, statistic)
                })
                .collect();
            let mut hosts = BTreeMap::new();
            hosts.insert(format!("node-{}", f % 4), 1.0f32);
            ParquetFileMetadata {
                path: format!("/warehouse/events/part-{f:05}.parquet"),
                length: 1_000 + f as i64,
                row_groups: vec![RowGroupMetadata {
                    start: 4,
                    length: 996 + f as i64,
                    row_count: f as i64 * 10,
                    host_affinity: hosts,
                    columns,
                }],
            }
        })
        .collect();

    TableMetadata::new(Header::new(vec!["/warehouse/events".into()]), dictionary, files)
}

#[test]
fn decode_reproduces_encoded_table() {
    let table = wide_table(20);
    let bytes = encode_to_vec(&table).unwrap();
    let decoded = decode_from_slice(&bytes, &CodecConfig::default()).unwrap();
    assert_eq!(decoded, table);
    assert!(diff(&decoded, &table).is_empty());
}

#[test]
fn encoding_is_byte_stable() {
    let table = wide_table(20);
    let first = encode_to_vec(&table).unwrap();
    let second = encode_to_vec(&table).unwrap();
    assert_eq!(first, second);

    // re-encoding a decoded cache yields the same bytes
    let decoded = decode_from_slice(&first, &CodecConfig::default()).unwrap();
    assert_eq!(encode_to_vec(&decoded).unwrap(), first);
}

#[test]
fn dictionary_ids_ignore_input_order() {
    let mut columns = wide_columns();
    let forward = ColumnDictionary::build(columns.clone()).unwrap();
    columns.reverse();
    columns.rotate_left(17);
    let shuffled = ColumnDictionary::build(columns).unwrap();

    assert_eq!(forward, shuffled);
    for (id, column) in forward.iter() {
        assert_eq!(shuffled.lookup(&column.dotted_name()).unwrap(), id);
    }
}

#[test]
fn import_of_export_matches() {
    let table = wide_table(30);
    let reimported = import_json(&export_json(&table).unwrap()).unwrap();
    assert!(diff(&reimported, &table).is_empty(), "{:?}", diff(&reimported, &table));
}

#[test]
fn empty_column_records_are_omitted() {
    let doc = json!({
        "metadata_version": "v2",
        "columnTypeInfo": {
            "a": {"name": ["a"], "primitiveType": "INT64", "originalType": null},
            "b": {"name": ["b"], "primitiveType": "INT64", "originalType": null}
        },
        "files": [{"path": "/d/f", "length": 10, "rowGroups": [{
            "start": 0, "length": 10, "rowCount": 5, "hostAffinity": {},
            "columns": [
                {"name": ["a"], "nulls": 0},
                {"name": ["b"], "nulls": 0, "mxValue": 4}
            ]
        }]}],
        "directories": ["/d"]
    });

    let table = import_json(&doc).unwrap();
    let decoded = decode_from_slice(&encode_to_vec(&table).unwrap(), &CodecConfig::default()).unwrap();
    let columns = &decoded.files[0].row_groups[0].columns;

    assert_eq!(columns.len(), 1);
    assert_eq!(decoded.column_type(&columns[0]).unwrap().dotted_name(), "b");

    // "a" has no entry: zero nulls, no statistic
    let a = decoded.dictionary.lookup("a").unwrap();
    assert!(columns.iter().all(|c| c.column_ref != a));
}

#[test]
fn unknown_column_ref_is_rejected_on_encode() {
    let mut table = wide_table(1);
    table.files[0].row_groups[0].columns.push(
        ColumnStatistics::new(COLUMN_COUNT as u32, 1, None).unwrap(),
    );
    assert!(matches!(
        encode_to_vec(&table),
        Err(MetaCacheError::ColumnNotFound(_))
    ));
}

#[test]
fn statistic_of_wrong_type_is_rejected_on_encode() {
    let mut table = wide_table(1);
    let int32 = table.dictionary.lookup("c00").unwrap();
    table.files[0].row_groups[0].columns = vec![
        ColumnStatistics::new(int32, 0, Some(StatisticValue::Int64(1))).unwrap(),
    ];
    assert!(matches!(
        encode_to_vec(&table),
        Err(MetaCacheError::TypeMismatch { .. })
    ));
}

#[test]
fn v1_json_is_rejected() {
    let doc = json!({
        "metadata_version": "v1",
        "columnTypeInfo": {},
        "files": [],
        "directories": []
    });
    assert!(matches!(
        import_json(&doc),
        Err(MetaCacheError::InvalidVersion(v)) if v == "v1"
    ));
}

#[test]
fn identical_and_diverging_caches() {
    let config = CodecConfig::default();
    let three = decode_from_slice(&encode_to_vec(&wide_table(3)).unwrap(), &config).unwrap();
    let three_again = decode_from_slice(&encode_to_vec(&wide_table(3)).unwrap(), &config).unwrap();
    let four = decode_from_slice(&encode_to_vec(&wide_table(4)).unwrap(), &config).unwrap();

    assert!(diff(&three, &three_again).is_empty());

    let diffs: Vec<String> = diff(&three, &four).iter().map(|d| d.to_string()).collect();
    assert_eq!(diffs, vec!["files.filesCount: 3 vs 4".to_string()]);
}

#[test]
fn ten_thousand_files_survive_round_trip() {
    let table = wide_table(10_000);
    let bytes = encode_to_vec(&table).unwrap();
    let decoded = decode_from_slice(&bytes, &CodecConfig::default()).unwrap();

    assert_eq!(decoded.files.len(), 10_000);
    assert_eq!(decoded.dictionary.len(), COLUMN_COUNT);
    for (got, want) in decoded.files.iter().zip(&table.files) {
        assert_eq!(got.path, want.path);
        assert_eq!(got.row_count(), want.row_count());
        assert_eq!(got.row_groups[0].columns, want.row_groups[0].columns);
    }

    // FLOAT 1.5 and DOUBLE 1.5 stay distinct
    let float_col = decoded.dictionary.lookup("c03").unwrap();
    let double_col = decoded.dictionary.lookup("c04").unwrap();
    let stats = &decoded.files[0].row_groups[0].columns;
    let find = |id| stats.iter().find(|c| c.column_ref == id).and_then(|c| c.statistic.clone());
    assert_eq!(find(float_col), Some(StatisticValue::Float(1.5)));
    assert_eq!(find(double_col), Some(StatisticValue::Double(1.5)));
    assert_ne!(find(float_col), find(double_col));
}
