use std::path::{Path, PathBuf};

use chrono::{FixedOffset, NaiveDate, Offset, TimeZone, Timelike, Utc};

use gdal_safe::context::CallOptions;
use gdal_safe::errors::GdalError;
use gdal_safe::handle::Ownership;
use gdal_safe::vector::{
    Feature, FieldAccessor, FieldDefinition, FieldKind, FieldValue, Geometry, LayerOptions,
    OGRwkbGeometryType,
};
use gdal_safe::{Dataset, DriverManager};

fn fixture(filename: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(filename)
}

fn memory_dataset() -> Dataset {
    let driver = DriverManager::get_driver_by_name("Memory").unwrap();
    driver.create_vector_only("", ()).unwrap()
}

fn typed_schema() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("int", FieldKind::Integer),
        FieldDefinition::new("int_list", FieldKind::IntegerList),
        FieldDefinition::new("real", FieldKind::Real),
        FieldDefinition::new("real_list", FieldKind::RealList),
        FieldDefinition::new("text", FieldKind::String),
        FieldDefinition::new("text_list", FieldKind::StringList),
        FieldDefinition::new("blob", FieldKind::Binary),
        FieldDefinition::new("stamp", FieldKind::DateTime),
        FieldDefinition::new("big", FieldKind::Integer64),
        FieldDefinition::new("big_list", FieldKind::Integer64List),
        FieldDefinition::new("day", FieldKind::Date),
    ]
}

#[test]
fn typed_fields_round_trip() {
    let mut dataset = memory_dataset();
    let schema = typed_schema();
    let mut layer = dataset
        .create_layer(
            LayerOptions {
                name: "typed",
                ty: OGRwkbGeometryType::wkbPoint,
                fields: &schema,
                ..Default::default()
            },
            (),
        )
        .unwrap();

    let mut feature = Feature::new(&layer.defn().unwrap()).unwrap();
    let stamp = FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 1, 12, 30, 45)
        .unwrap();
    {
        let mut fields = feature.fields().unwrap();
        let field = |name: &str| fields.by_name(name).unwrap().clone();
        let mut int = field("int");
        FieldAccessor::<i32>::new(&feature).set(&mut int, 7, ()).unwrap();
        assert_eq!(int.value, FieldValue::Integer(7));
        assert!(int.is_set);

        FieldAccessor::<Vec<i32>>::new(&feature)
            .set(fields.by_name_mut("int_list").unwrap(), vec![1, 2, 3], ())
            .unwrap();
        FieldAccessor::<f64>::new(&feature)
            .set(fields.by_name_mut("real").unwrap(), 2.5, ())
            .unwrap();
        FieldAccessor::<Vec<f64>>::new(&feature)
            .set(fields.by_name_mut("real_list").unwrap(), vec![0.5, -1.0], ())
            .unwrap();
        FieldAccessor::<String>::new(&feature)
            .set(fields.by_name_mut("text").unwrap(), "hello".to_string(), ())
            .unwrap();
        FieldAccessor::<Vec<String>>::new(&feature)
            .set(
                fields.by_name_mut("text_list").unwrap(),
                vec!["a".to_string(), "b".to_string()],
                (),
            )
            .unwrap();
        FieldAccessor::<Vec<u8>>::new(&feature)
            .set(fields.by_name_mut("blob").unwrap(), vec![0, 255, 16], ())
            .unwrap();
        FieldAccessor::<chrono::DateTime<FixedOffset>>::new(&feature)
            .set(fields.by_name_mut("stamp").unwrap(), stamp, ())
            .unwrap();
        FieldAccessor::<i64>::new(&feature)
            .set(fields.by_name_mut("big").unwrap(), 1 << 40, ())
            .unwrap();
        FieldAccessor::<Vec<i64>>::new(&feature)
            .set(fields.by_name_mut("big_list").unwrap(), vec![-(1 << 33), 5], ())
            .unwrap();
        FieldAccessor::<chrono::DateTime<FixedOffset>>::new(&feature)
            .set(fields.by_name_mut("day").unwrap(), stamp, ())
            .unwrap();
    }
    layer.create_feature(&mut feature, ()).unwrap();
    assert!(feature.fid().is_some());

    let stored = layer.features().next().unwrap().unwrap();
    let fields = stored.fields().unwrap();
    assert_eq!(fields.len(), 11);
    assert!(fields.iter().all(|f| f.is_set));

    let value = |name: &str| fields.by_name(name).unwrap().value.clone();
    assert_eq!(value("int"), FieldValue::Integer(7));
    assert_eq!(value("int_list"), FieldValue::IntegerList(vec![1, 2, 3]));
    assert_eq!(value("real"), FieldValue::Real(2.5));
    assert_eq!(value("real_list"), FieldValue::RealList(vec![0.5, -1.0]));
    assert_eq!(value("text"), FieldValue::String("hello".to_string()));
    assert_eq!(
        value("text_list"),
        FieldValue::StringList(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(value("blob"), FieldValue::Binary(vec![0, 255, 16]));
    assert_eq!(value("big"), FieldValue::Integer64(1 << 40));
    assert_eq!(value("big_list"), FieldValue::Integer64List(vec![-(1 << 33), 5]));

    // temporal values come back as UTC with the wall-clock fields that were written
    let utc = Utc.fix();
    assert_eq!(
        value("stamp"),
        FieldValue::DateTime(utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap())
    );
    match value("day") {
        FieldValue::Date(day) => {
            assert_eq!(day.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        }
        other => panic!("unexpected {other:?}"),
    }

    let reader = FieldAccessor::<i32>::unbound();
    assert_eq!(reader.get(fields.by_name("int").unwrap()).unwrap(), 7);
}

#[test]
fn accessor_kind_mismatch() {
    let mut dataset = memory_dataset();
    let schema = typed_schema();
    let layer = dataset
        .create_layer(
            LayerOptions {
                name: "typed",
                fields: &schema,
                ..Default::default()
            },
            (),
        )
        .unwrap();
    let feature = Feature::new(&layer.defn().unwrap()).unwrap();
    let mut fields = feature.fields().unwrap();

    let wide = FieldAccessor::<i64>::new(&feature);
    assert!(matches!(
        wide.get(fields.by_name("int").unwrap()),
        Err(GdalError::TypeMismatch {
            kind: FieldKind::Integer,
            requested: "i64"
        })
    ));
    assert!(matches!(
        wide.set(fields.by_name_mut("int").unwrap(), 1, ()),
        Err(GdalError::TypeMismatch { .. })
    ));
    // a rejected write leaves the feature untouched
    assert!(!feature.fields().unwrap().by_name("int").unwrap().is_set);

    assert!(matches!(
        FieldAccessor::<i32>::unbound().set(fields.by_name_mut("int").unwrap(), 1, ()),
        Err(GdalError::MissingBinding)
    ));
    assert!(matches!(
        fields.by_name("nope"),
        Err(GdalError::InvalidFieldName { .. })
    ));
}

fn single_field_feature(dataset: &mut Dataset, layer: &str, kind: FieldKind) -> Feature {
    let fields = [FieldDefinition::new("n", kind)];
    let layer = dataset
        .create_layer(
            LayerOptions {
                name: layer,
                fields: &fields,
                ..Default::default()
            },
            (),
        )
        .unwrap();
    let defn = layer.defn().unwrap();
    Feature::new(&defn).unwrap()
}

#[test]
fn field_from_another_schema_is_rejected() {
    let mut dataset = memory_dataset();
    let ints = single_field_feature(&mut dataset, "ints", FieldKind::Integer);
    let texts = single_field_feature(&mut dataset, "texts", FieldKind::String);

    let mut foreign = texts.fields().unwrap().by_index(0).unwrap().clone();
    assert!(matches!(
        FieldAccessor::<String>::new(&ints).set(&mut foreign, "x".to_string(), ()),
        Err(GdalError::TypeMismatch {
            kind: FieldKind::Integer,
            requested: "String"
        })
    ));

    let mut tampered = ints.fields().unwrap().by_index(0).unwrap().clone();
    tampered.value = FieldValue::String(String::new());
    assert!(FieldAccessor::<String>::new(&ints)
        .set(&mut tampered, "x".to_string(), ())
        .is_err());
    assert!(!ints.fields().unwrap().by_index(0).unwrap().is_set);
}

#[test]
fn cached_temporal_value_matches_storage() {
    let mut dataset = memory_dataset();
    let feature = single_field_feature(&mut dataset, "stamps", FieldKind::DateTime);
    let precise = Utc
        .fix()
        .with_ymd_and_hms(2024, 3, 1, 12, 30, 45)
        .unwrap()
        .with_nanosecond(250_000_000)
        .unwrap();

    let mut field = feature.fields().unwrap().by_index(0).unwrap().clone();
    let opts = CallOptions::default().without_default_handler();
    FieldAccessor::<chrono::DateTime<FixedOffset>>::new(&feature)
        .set(&mut field, precise, opts)
        .unwrap();

    let stored = feature.fields().unwrap().by_index(0).unwrap().value.clone();
    assert_eq!(field.value, stored);
    assert_eq!(
        field.value,
        FieldValue::DateTime(precise.with_nanosecond(0).unwrap())
    );
}

#[test]
fn unset_fields_read_as_zero() {
    let mut dataset = memory_dataset();
    let schema = typed_schema();
    let layer = dataset
        .create_layer(
            LayerOptions {
                name: "typed",
                fields: &schema,
                ..Default::default()
            },
            (),
        )
        .unwrap();
    let feature = Feature::new(&layer.defn().unwrap()).unwrap();
    let fields = feature.fields().unwrap();
    assert!(fields.iter().all(|f| !f.is_set));
    assert_eq!(fields.by_name("int").unwrap().value, FieldValue::Integer(0));
    assert_eq!(
        fields.by_name("text").unwrap().value,
        FieldValue::String(String::new())
    );
    assert_eq!(fields.by_name("blob").unwrap().kind(), FieldKind::Binary);
}

#[test]
fn empty_schema_has_no_fields() {
    let mut dataset = memory_dataset();
    let mut layer = dataset
        .create_layer(
            LayerOptions {
                name: "bare",
                ty: OGRwkbGeometryType::wkbPoint,
                ..Default::default()
            },
            (),
        )
        .unwrap();
    assert_eq!(layer.defn().unwrap().field_count(), 0);
    let point = Geometry::from_wkt("POINT (1 2)", None, ()).unwrap();
    let feature = layer.new_feature(Some(&point), ()).unwrap();
    assert!(feature.fields().unwrap().is_empty());
}

#[test]
fn feature_update_and_delete() {
    let mut dataset = memory_dataset();
    let fields = [FieldDefinition::new("rank", FieldKind::Integer)];
    let mut layer = dataset
        .create_layer(
            LayerOptions {
                name: "ranked",
                ty: OGRwkbGeometryType::wkbPoint,
                fields: &fields,
                ..Default::default()
            },
            (),
        )
        .unwrap();

    let first = Geometry::from_wkt("POINT (1 1)", None, ()).unwrap();
    let second = Geometry::from_wkt("POINT (2 2)", None, ()).unwrap();
    let mut kept = layer.new_feature(Some(&first), ()).unwrap();
    let dropped = layer.new_feature(Some(&second), ()).unwrap();
    assert_ne!(kept.fid(), dropped.fid());
    assert_eq!(layer.feature_count(()).unwrap(), 2);

    let mut rank = kept.fields().unwrap().by_name("rank").unwrap().clone();
    FieldAccessor::<i32>::new(&kept).set(&mut rank, 3, ()).unwrap();
    layer.update_feature(&kept, ()).unwrap();

    layer.delete_feature(&dropped, ()).unwrap();
    assert_eq!(layer.feature_count(()).unwrap(), 1);

    let stored = layer.features().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].fid(), kept.fid());
    assert_eq!(
        stored[0].fields().unwrap().by_name("rank").unwrap().value,
        FieldValue::Integer(3)
    );

    let unsaved = Feature::new(&layer.defn().unwrap()).unwrap();
    assert!(matches!(
        layer.delete_feature(&unsaved, ()),
        Err(GdalError::BadArgument(_))
    ));

    kept.set_fid(None).unwrap();
    assert_eq!(kept.fid(), None);
}

#[test]
fn take_and_replace_geometry() {
    let mut dataset = memory_dataset();
    let mut layer = dataset
        .create_layer(
            LayerOptions {
                name: "shapes",
                ty: OGRwkbGeometryType::wkbPolygon,
                ..Default::default()
            },
            (),
        )
        .unwrap();
    let square = Geometry::from_wkt("POLYGON ((0 0,0 2,2 2,2 0,0 0))", None, ()).unwrap();
    let mut feature = layer.new_feature(Some(&square), ()).unwrap();

    assert_eq!(feature.geometry().unwrap().unwrap().area().unwrap(), 4.0);
    let taken = feature.take_geometry().unwrap().unwrap();
    assert_eq!(taken.ownership(), Ownership::Owned);
    assert!(feature.geometry().unwrap().is_none());
    assert!(feature.take_geometry().unwrap().is_none());

    let small = Geometry::from_wkt("POLYGON ((0 0,0 1,1 1,1 0,0 0))", None, ()).unwrap();
    feature.set_geometry(&small, ()).unwrap();
    // the feature holds a copy
    drop(small);
    assert_eq!(feature.geometry().unwrap().unwrap().area().unwrap(), 1.0);
    feature.set_geometry_column_name("shape", ()).unwrap();
    assert_eq!(taken.area().unwrap(), 4.0);
}

#[test]
fn layer_from_fixture() {
    let dataset = Dataset::open(fixture("test.geojson")).unwrap();
    let mut layer = dataset.layer(0).unwrap();
    assert_eq!(layer.feature_count(()).unwrap(), 1);
    assert!(layer.spatial_ref().unwrap().is_some());

    let bounds = layer.bounds(()).unwrap();
    assert_eq!((bounds.min_x, bounds.max_x), (100.0, 101.0));
    assert_eq!((bounds.min_y, bounds.max_y), (0.0, 1.0));

    let defn = layer.defn().unwrap();
    let names = defn.fields().map(|f| f.name()).collect::<Vec<_>>();
    assert_eq!(names, ["name", "rank"]);
    assert_eq!(defn.field_index("rank").unwrap(), 1);
    assert!(defn.field_index("nope").is_err());

    let feature = layer.next_feature().unwrap().unwrap();
    let fields = feature.fields().unwrap();
    assert_eq!(
        FieldAccessor::<String>::unbound()
            .get(fields.by_name("name").unwrap())
            .unwrap(),
        "square"
    );
    assert!(layer.next_feature().unwrap().is_none());
}

#[test]
fn copy_layer_between_datasets() {
    let source = Dataset::open(fixture("test.geojson")).unwrap();
    let layer = source.layer(0).unwrap();

    let mut target = memory_dataset();
    let mut copy = target.copy_layer(&layer, "copied", ()).unwrap();
    assert_eq!(copy.name().unwrap(), "copied");
    assert_eq!(copy.feature_count(()).unwrap(), 1);
    let feature = copy.next_feature().unwrap().unwrap();
    assert_eq!(
        feature.fields().unwrap().by_name("rank").unwrap().value,
        FieldValue::Integer(1)
    );

    drop(copy);
    assert_eq!(target.layer_count().unwrap(), 1);
    assert!(target.layer_by_name("copied").unwrap().is_some());
}
