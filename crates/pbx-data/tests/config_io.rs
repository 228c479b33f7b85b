use std::fs;

use pbx_box::BoxLike;
use pbx_data::{
    system_from_json, system_to_json, write_system, write_xyz, CellConfig, CellKind,
    GenerateOptions, OutputFormat, ReplicaCount, RunConfig, UnitCell,
};
use tempfile::tempdir;

const CUSTOM_YAML: &str = r#"
cell:
  kind: custom
  box: [2.0, 3.0, 4.0]
  basis:
    - [0.0, 0.0, 0.0]
    - [0.5, 0.5, 0.5]
generate:
  num_replicas: [2, 1, 1]
  scale: 1.5
seed: 11
output:
  format: xyz
  element: Ar
"#;

#[test]
fn yaml_config_parses_with_defaults() {
    let config = RunConfig::from_yaml_str(CUSTOM_YAML).unwrap();
    assert_eq!(config.cell.kind, CellKind::Custom);
    assert_eq!(config.cell.sim_box, Some(BoxLike::AxisLengths3([2.0, 3.0, 4.0])));
    assert_eq!(config.generate.num_replicas, ReplicaCount::PerAxis([2, 1, 1]));
    assert_eq!(config.generate.scale, 1.5);
    assert_eq!(config.generate.sigma_noise, 0.0);
    assert_eq!(config.seed, 11);
    assert_eq!(config.output.format, OutputFormat::Xyz);
    assert_eq!(config.output.element, "Ar");

    let system = config.run().unwrap();
    assert_eq!(system.len(), 4);
    assert_eq!(system.provenance.seed, Some(11));
}

#[test]
fn empty_config_generates_a_single_simple_cubic_site() {
    let config = RunConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config.cell.kind, CellKind::Sc);
    assert_eq!(config.generate, GenerateOptions::default());
    assert_eq!(config.output.format, OutputFormat::Json);
    assert_eq!(config.output.element, "A");
    assert_eq!(config.run().unwrap().len(), 1);
}

#[test]
fn uniform_replicas_parse_from_a_single_integer() {
    let config = RunConfig::from_yaml_str("cell: {kind: bcc}\ngenerate: {num_replicas: 3}\n").unwrap();
    assert_eq!(config.generate.num_replicas, ReplicaCount::Uniform(3));
    assert_eq!(config.run().unwrap().len(), 54);
}

#[test]
fn configured_stream_selects_a_noise_substream() {
    let base = "cell: {kind: fcc}\ngenerate: {num_replicas: 2, sigma_noise: 0.1}\nseed: 5\n";
    let plain = RunConfig::from_yaml_str(base).unwrap();
    assert_eq!(plain.stream, None);
    let streamed = RunConfig::from_yaml_str(&format!("{base}stream: 3\n")).unwrap();
    assert_eq!(streamed.stream, Some(3));

    let a = plain.run().unwrap();
    let b = streamed.run().unwrap();
    assert_ne!(a.positions, b.positions);
    assert_eq!(b.provenance.seed, Some(5));
    assert_eq!(b.provenance.stream, Some(3));
    assert_eq!(streamed.run().unwrap(), b);
}

#[test]
fn named_cells_reject_explicit_geometry() {
    let cell = CellConfig {
        kind: CellKind::Fcc,
        sim_box: Some(BoxLike::Scalar(2.0)),
        basis: None,
    };
    assert_eq!(cell.build().unwrap_err().code(), "cell-overspecified");

    let custom = CellConfig {
        kind: CellKind::Custom,
        sim_box: None,
        basis: None,
    };
    assert_eq!(custom.build().unwrap_err().code(), "cell-missing-box");
}

#[test]
fn unknown_kinds_fail_to_parse() {
    let err = RunConfig::from_yaml_str("cell: {kind: hcp}\n").unwrap_err();
    assert_eq!(err.code(), "deserialize-yaml");
    assert_eq!("hcp".parse::<CellKind>().unwrap_err().code(), "unknown-cell");
    assert_eq!("FCC".parse::<CellKind>().unwrap(), CellKind::Fcc);
}

#[test]
fn config_files_load_by_extension() {
    let dir = tempdir().unwrap();
    let config = RunConfig::from_yaml_str(CUSTOM_YAML).unwrap();

    let yaml_path = dir.path().join("run.yaml");
    fs::write(&yaml_path, config.to_yaml_string().unwrap()).unwrap();
    assert_eq!(RunConfig::load(&yaml_path).unwrap(), config);

    let json_path = dir.path().join("run.json");
    fs::write(&json_path, serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(RunConfig::load(&json_path).unwrap(), config);

    let err = RunConfig::load(&dir.path().join("missing.yaml")).unwrap_err();
    assert_eq!(err.code(), "io");
    assert!(err.info().context.contains_key("path"));
}

#[test]
fn json_round_trip_preserves_the_system() {
    let options = GenerateOptions::replicas(2).with_sigma_noise(0.1);
    let system = pbx_data::generate_system(&UnitCell::bcc(), &options, 9).unwrap();
    let json = system_to_json(&system).unwrap();
    let restored = system_from_json(&json).unwrap();
    assert_eq!(restored, system);
    assert_eq!(
        system_from_json("{\"box\": 1}").unwrap_err().code(),
        "deserialize-json"
    );
}

#[test]
fn xyz_output_lists_every_particle() {
    let system =
        pbx_data::generate_system(&UnitCell::square(), &GenerateOptions::replicas(2), 0).unwrap();
    let mut buffer = Vec::new();
    write_xyz(&system, &mut buffer, "Ni").unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "4");
    assert!(lines[1].starts_with(
        "Lattice=\"2.000000 0.000000 0.000000 0.000000 2.000000 0.000000 0.000000 0.000000 0.000000\""
    ));
    assert!(lines[1].ends_with("pbc=\"T T F\""));
    assert_eq!(lines.len(), 6);
    assert!(lines[2..].iter().all(|line| line.starts_with("Ni ")));
}

#[test]
fn systems_are_written_in_the_requested_format() {
    let dir = tempdir().unwrap();
    let system = RunConfig::from_yaml_str(CUSTOM_YAML).unwrap().run().unwrap();

    let json_path = dir.path().join("nested/system.json");
    write_system(&system, &json_path, OutputFormat::Json, "A").unwrap();
    let restored = system_from_json(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(restored, system);

    let xyz_path = dir.path().join("system.xyz");
    write_system(&system, &xyz_path, OutputFormat::Xyz, "Ar").unwrap();
    let text = fs::read_to_string(&xyz_path).unwrap();
    assert_eq!(text.lines().count(), system.len() + 2);

    assert_eq!("XYZ".parse::<OutputFormat>().unwrap(), OutputFormat::Xyz);
    assert_eq!("pdb".parse::<OutputFormat>().unwrap_err().code(), "unknown-format");
}
