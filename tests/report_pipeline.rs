use std::io::Write;

use diagplot::data::loader::{self, DEFAULT_VALUE_COLUMN};
use diagplot::report::{ChartReport, SeriesSection};
use diagplot::state::grouping::{DimensionChoice, GroupingConfig, GroupingOverrides};
use diagplot::state::settings::ChartSettings;
use diagplot::DiagplotError;

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const ENSEMBLE_CSV: &str = "\
Ensemble export
source_id,experiment_id,metric,region,value
ModelA,historical,rmse,global,1.0
ModelB,historical,rmse,global,2.0
ModelC,historical,rmse,global,3.0
ModelD,historical,rmse,global,4.0
ModelE,historical,rmse,global,5.0
ModelA,ssp585,rmse,global,2.0
ModelB,ssp585,rmse,global,nan
ModelC,ssp585,rmse,global,40.0
Reference,historical,rmse,global,2.5
";

#[test]
fn csv_ensemble_summary() {
    let file = write_temp(".csv", ENSEMBLE_CSV);
    let collection = loader::load_file(file.path(), DEFAULT_VALUE_COLUMN).unwrap();
    assert_eq!(collection.count, 9);
    assert_eq!(collection.types, vec!["scalar".to_string()]);

    let settings = ChartSettings {
        ensemble_dimension: Some(DimensionChoice::named("experiment_id")),
        clip_max: Some(10.0),
        ..Default::default()
    };
    let report = ChartReport::build(&collection, &settings, &GroupingOverrides::default());

    assert_eq!(report.available.dimensions, vec!["experiment_id", "metric", "region", "source_id"]);
    assert_eq!(report.grouping, GroupingConfig::new("source_id", "source_id", "none"));

    let ensemble = report.ensemble.as_ref().unwrap();
    assert_eq!(ensemble.dimension, "experiment_id");
    assert_eq!(ensemble.categories.len(), 2);

    let historical = &ensemble.categories[0];
    assert_eq!(historical.name, "historical");
    let b = historical.box_plot.as_ref().unwrap();
    assert_eq!(b.values, vec![1.0, 2.0, 2.5, 3.0, 4.0, 5.0]);
    assert_eq!(b.median, 2.75);
    assert_eq!(b.lower_quartile, 2.0);
    assert_eq!(b.upper_quartile, 4.0);
    assert!(b.draws_box());

    let ssp = &ensemble.categories[1];
    assert_eq!(ssp.clipped, 1);
    assert_eq!(ssp.record_count, 3);
    assert_eq!(ssp.box_plot.as_ref().unwrap().values, vec![2.0]);

    assert_eq!(ensemble.y_domain, (1.0, 5.0));
    assert!(matches!(report.series, SeriesSection::Empty));

    let text = report.render();
    assert!(text.contains("Grouping: groupBy=source_id hue=source_id style=none"));
    assert!(text.contains("historical: n=6"));
    assert!(text.contains("ssp585: n=1"));
    assert!(text.contains("[points] clipped=1"));
}

const SERIES_JSON: &str = r#"{
  "data": [
    {"dimensions": {"source_id": "ModelA", "experiment_id": "historical", "region": "global"},
     "values": [1.0, 2.0, null], "index": [1990, 2000, 2010], "index_name": "year",
     "execution_group_id": 1, "execution_id": 10},
    {"dimensions": {"source_id": "Reference", "experiment_id": "historical", "region": "global"},
     "values": [1.5, 2.5, 3.5], "index": [1990, 2000, 2010], "index_name": "year",
     "execution_group_id": 1, "execution_id": 11},
    {"dimensions": {"source_id": "ModelA", "experiment_id": "ssp585", "region": "global"},
     "values": [3.0, 4.0], "index": [2020, 2030], "index_name": "year",
     "execution_group_id": 2, "execution_id": 12}
  ],
  "count": 3,
  "facets": [],
  "types": ["series"]
}"#;

#[test]
fn json_series_grouping() {
    let file = write_temp(".json", SERIES_JSON);
    let collection = loader::load_file(file.path(), DEFAULT_VALUE_COLUMN).unwrap();
    assert_eq!(collection.series().len(), 3);
    assert_eq!(collection.facets.len(), 3);

    let overrides = GroupingOverrides {
        group_by: Some("experiment_id".into()),
        hue: Some("source_id".into()),
        style: Some("not_a_dimension".into()),
    };
    let report = ChartReport::build(&collection, &ChartSettings::default(), &overrides);
    assert_eq!(report.grouping, GroupingConfig::new("experiment_id", "source_id", "none"));
    assert!(report.ensemble.is_none());

    let SeriesSection::Grouped { groups } = &report.series else {
        panic!("expected grouped series, got {:?}", report.series);
    };
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].category, "historical");
    assert_eq!(groups[0].index_name.as_deref(), Some("year"));
    assert_eq!(groups[0].index_span, Some(("1990.0".to_string(), "2010.0".to_string())));

    let lines = &groups[0].lines;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].key, "experiment_id:historical | source_id:ModelA");
    assert_eq!(lines[0].points, 2);
    assert!(!lines[0].is_reference);
    assert!(lines[1].is_reference);
    assert_eq!(lines[1].style.stroke_width, 10.0);
    assert_eq!(lines[1].style.dasharray, "none");

    // Same hue value, same colour, across groups.
    let ssp_line = &groups[1].lines[0];
    assert_eq!(ssp_line.style.color, lines[0].style.color);
}

#[test]
fn series_limit_is_enforced() {
    let file = write_temp(".json", SERIES_JSON);
    let collection = loader::load_file(file.path(), DEFAULT_VALUE_COLUMN).unwrap();
    let settings = ChartSettings { max_series: 2, ..Default::default() };
    let report = ChartReport::build(&collection, &settings, &GroupingOverrides::default());
    assert!(matches!(report.series, SeriesSection::TooMany { count: 3, limit: 2 }));
    assert!(report.render().contains("Too many series to display"));
}

#[test]
fn settings_file_drives_grouping() {
    let settings_file = write_temp(".json", r#"{"grouping": {"groupBy": "region", "hue": "none"}, "maxSeries": 10}"#);
    let settings = ChartSettings::load(settings_file.path()).unwrap();
    assert_eq!(settings.max_series, 10);

    let data = write_temp(".csv", ENSEMBLE_CSV);
    let collection = loader::load_file(data.path(), DEFAULT_VALUE_COLUMN).unwrap();

    // Command line choices win over the file.
    let overrides = GroupingOverrides { hue: Some("metric".into()), ..Default::default() };
    let report = ChartReport::build(&collection, &settings, &overrides);
    assert_eq!(report.grouping, GroupingConfig::new("region", "metric", "none"));

    let ensemble = report.ensemble.unwrap();
    assert_eq!(ensemble.dimension, "region");
    assert_eq!(ensemble.categories.len(), 1);
    assert_eq!(ensemble.categories[0].name, "global");

    let saved = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    settings.save(saved.path()).unwrap();
    assert_eq!(ChartSettings::load(saved.path()).unwrap(), settings);
}

#[test]
fn loader_errors() {
    let file = write_temp(".txt", "hello");
    assert!(matches!(
        loader::load_file(file.path(), DEFAULT_VALUE_COLUMN),
        Err(DiagplotError::UnsupportedFormat(ext)) if ext == "txt"
    ));

    let file = write_temp(".csv", "source_id,score\nModelA,1.0\n");
    assert!(matches!(
        loader::load_file(file.path(), DEFAULT_VALUE_COLUMN),
        Err(DiagplotError::MissingValueColumn(_))
    ));

    let file = write_temp(".json", "{not json");
    assert!(matches!(loader::load_file(file.path(), DEFAULT_VALUE_COLUMN), Err(DiagplotError::Json(_))));

    let file = write_temp(".json", r#"{"clipMin": 3, "clipMax": 1}"#);
    assert!(matches!(ChartSettings::load(file.path()), Err(DiagplotError::InvalidSettings(_))));
}
