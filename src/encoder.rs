//! Builds a settings model from structured composition data.
//!
//! The encoder is the inverse of the decoder in
//! [`crate::parser::input_file`]: it assembles a complete
//! [`SettingsModel`] from the beam table, target table, layer table and
//! scalar run parameters of a front-end, ready for the writer. It has no
//! error path. Callers own the consistency of their composition tables;
//! an element present in neither side simply gets the registry defaults.

use crate::element_db::{Element, ElementDb};
use crate::models::{
    BeamComponent, Occurrence, RunParameters, SettingsModel, TargetComponent, TargetLayer, Value,
};
use crate::registry::{VarDefault, VarRegistry};

/// Assembles a settings model from composition tables and run parameters.
///
/// Elements appear in the model in the order of `symbols`; that order
/// drives all per-element arrays and the layer abundance rows. The three
/// per-element property arrays (`dns0`, `e_surfb`, `e_displ`) are only
/// populated when at least one element deviates from its database value,
/// so untouched compositions keep the engine's built-in defaults.
#[must_use]
pub fn encode(
    db: &ElementDb,
    symbols: &[String],
    beam: &[BeamComponent],
    target: &[TargetComponent],
    layers: &[TargetLayer],
    params: &RunParameters,
) -> SettingsModel {
    let registry = VarRegistry::new();
    let mut model = SettingsModel::new(params.title.clone());
    let ncp = symbols.len();

    let mut occurrences = Vec::with_capacity(ncp);
    let mut inel0 = Vec::with_capacity(ncp);
    let mut qubeam = Vec::with_capacity(ncp);
    let mut e0 = Vec::with_capacity(ncp);
    let mut alpha0 = Vec::with_capacity(ncp);
    let mut qu = Vec::with_capacity(ncp);
    let mut qumax = Vec::with_capacity(ncp);
    let mut dns0 = Vec::with_capacity(ncp);
    let mut e_surfb = Vec::with_capacity(ncp);
    let mut e_displ = Vec::with_capacity(ncp);

    for symbol in symbols {
        let in_beam = beam.iter().find(|c| &c.symbol == symbol);
        let in_target = target.iter().find(|c| &c.symbol == symbol);
        occurrences.push(Occurrence {
            in_beam: in_beam.is_some(),
            in_target: in_target.is_some(),
        });

        // Shared per-element fields come from whichever side carries the
        // element; the target table wins when both do
        inel0.push(pick(
            in_target.map(|c| f64::from(c.inel_loss_model)),
            in_beam.map(|c| f64::from(c.inel_loss_model)),
            registry_number(&registry, "inel0"),
        ));
        qumax.push(pick(
            in_target.map(|c| c.max_concentration),
            in_beam.map(|c| c.max_concentration),
            registry_number(&registry, "qumax"),
        ));
        dns0.push(pick(
            in_target.map(|c| c.atomic_density),
            in_beam.map(|c| c.atomic_density),
            element_property(db, symbol, |e| e.atomic_density),
        ));
        e_surfb.push(pick(
            in_target.map(|c| c.surf_bind_energy),
            in_beam.map(|c| c.surf_bind_energy),
            element_property(db, symbol, |e| e.surface_binding_energy),
        ));
        e_displ.push(pick(
            in_target.map(|c| c.displ_energy),
            in_beam.map(|c| c.displ_energy),
            element_property(db, symbol, |e| e.displacement_energy),
        ));

        qubeam.push(in_beam.map_or(0.0, |c| c.abundance));
        e0.push(in_beam.map_or(0.0, |c| c.kin_energy));
        alpha0.push(in_beam.map_or(0.0, |c| c.angle));

        // Initial target abundance is taken from the topmost layer
        qu.push(match in_target {
            Some(_) => target
                .iter()
                .position(|c| &c.symbol == symbol)
                .and_then(|idx| layers.first().and_then(|l| l.abundances.get(idx)))
                .copied()
                .unwrap_or(0.0),
            None => 0.0,
        });
    }

    model.set("ncp", Value::Scalar(ncp as f64));
    model.set("symbol", Value::Symbols(symbols.to_vec()));
    model.set("dns0", sparse_array(db, symbols, dns0, |e| e.atomic_density));
    model.set(
        "e_surfb",
        sparse_array(db, symbols, e_surfb, |e| e.surface_binding_energy),
    );
    model.set(
        "e_displ",
        sparse_array(db, symbols, e_displ, |e| e.displacement_energy),
    );
    model.set("occurrence", Value::Occurrences(occurrences));
    model.set(
        "globaldensity",
        Value::Toggle(params.global_density_enabled, params.global_density),
    );
    model.set("inel0", Value::Numbers(inel0));
    model.set("nh", Value::Scalar(params.histories));
    model.set("idout", Value::Scalar(params.histories_between_outputs));
    model.set("nr_pproj", Value::Scalar(params.projectiles_per_history));
    model.set("flc", Value::Scalar(params.fluence));
    model.set("idrel", Value::Scalar(params.calc_method));
    model.set("ipot", Value::Scalar(params.interact_potential));
    model.set("iintegral", Value::Scalar(params.integration_method));
    model.set("isbv", Value::Scalar(params.surface_binding_model));
    model.set("qubeam", Value::Numbers(qubeam));
    model.set("case_e0", Value::Scalar(params.kin_energy_type));
    model.set("e0", Value::Numbers(e0));
    model.set("case_alpha", Value::Scalar(params.angle_type));
    model.set("alpha0", Value::Numbers(alpha0));
    model.set("number_calc", Value::Scalar(params.sweep_steps));
    model.set("qu", Value::Numbers(qu));
    model.set("qumax", Value::Numbers(qumax));
    model.set("ttarget", Value::Scalar(params.target_thickness));
    model.set("nqx", Value::Scalar(params.target_segments));
    // More than one layer means the engine must read a layer file
    model.set(
        "iq0",
        Value::Scalar(if layers.len() > 1 { -1.0 } else { 0.0 }),
    );
    model.set("lparticle_p", Value::Bool(params.output_reflected));
    model.set("lparticle_r", Value::Bool(params.output_sputtered));
    model.set("lmatrices", Value::Bool(params.output_matrices));

    model.extra_lines = params.additional_settings.clone();
    model.layers = layers.to_vec();
    model.layer_abundances = layer_rows(symbols, target, layers);

    model
}

/// Target value if present, else beam value, else the fallback.
fn pick(target: Option<f64>, beam: Option<f64>, fallback: f64) -> f64 {
    target.or(beam).unwrap_or(fallback)
}

fn registry_number(registry: &VarRegistry, name: &str) -> f64 {
    match registry.default_of(name) {
        Some(VarDefault::Number(n)) => n,
        _ => 0.0,
    }
}

fn element_property(db: &ElementDb, symbol: &str, prop: impl Fn(&Element) -> f64) -> f64 {
    db.by_symbol(symbol).map_or(0.0, prop)
}

/// Keeps a per-element property array only when some entry differs from
/// the element-database value; an all-default array is dropped so the
/// engine falls back to its own table.
fn sparse_array(
    db: &ElementDb,
    symbols: &[String],
    values: Vec<f64>,
    prop: impl Fn(&Element) -> f64,
) -> Value {
    let customized = symbols
        .iter()
        .zip(&values)
        .any(|(symbol, &value)| value != element_property(db, symbol, &prop));
    if customized {
        Value::Numbers(values)
    } else {
        Value::Numbers(Vec::new())
    }
}

/// One abundance row per layer, with one column per element in element
/// order. Elements absent from the target composition get 0.
fn layer_rows(
    symbols: &[String],
    target: &[TargetComponent],
    layers: &[TargetLayer],
) -> Vec<Vec<f64>> {
    layers
        .iter()
        .map(|layer| {
            symbols
                .iter()
                .map(|symbol| {
                    target
                        .iter()
                        .position(|c| &c.symbol == symbol)
                        .and_then(|idx| layer.abundances.get(idx))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> ElementDb {
        ElementDb::load().unwrap()
    }

    fn beam_entry(symbol: &str) -> BeamComponent {
        let element = db().by_symbol(symbol).cloned().unwrap();
        BeamComponent {
            symbol: symbol.to_string(),
            abundance: 1.0,
            kin_energy: 500.0,
            angle: 0.0,
            max_concentration: 1.0,
            atomic_density: element.atomic_density,
            surf_bind_energy: element.surface_binding_energy,
            displ_energy: element.displacement_energy,
            inel_loss_model: 3,
        }
    }

    fn target_entry(symbol: &str) -> TargetComponent {
        let element = db().by_symbol(symbol).cloned().unwrap();
        TargetComponent {
            symbol: symbol.to_string(),
            max_concentration: 1.0,
            atomic_density: element.atomic_density,
            surf_bind_energy: element.surface_binding_energy,
            displ_energy: element.displacement_energy,
            inel_loss_model: 3,
        }
    }

    fn single_layer(abundances: Vec<f64>) -> Vec<TargetLayer> {
        vec![TargetLayer {
            segment_count: 200,
            segment_thickness: 10.0,
            abundances,
            name: "bulk".to_string(),
        }]
    }

    #[test]
    fn test_occurrence_from_membership() {
        let symbols = vec!["H".to_string(), "Fe".to_string()];
        let model = encode(
            &db(),
            &symbols,
            &[beam_entry("H")],
            &[target_entry("Fe")],
            &single_layer(vec![1.0]),
            &RunParameters::default(),
        );
        let occ = model.occurrences("occurrence").unwrap();
        assert!(occ[0].in_beam && !occ[0].in_target);
        assert!(!occ[1].in_beam && occ[1].in_target);
    }

    #[test]
    fn test_target_wins_for_shared_fields() {
        let symbols = vec!["Fe".to_string()];
        let mut beam = beam_entry("Fe");
        beam.inel_loss_model = 1;
        beam.max_concentration = 0.5;
        let mut target = target_entry("Fe");
        target.inel_loss_model = 2;
        target.max_concentration = 0.8;
        let model = encode(
            &db(),
            &symbols,
            &[beam],
            &[target],
            &single_layer(vec![1.0]),
            &RunParameters::default(),
        );
        assert_eq!(model.numbers("inel0"), Some(&[2.0][..]));
        assert_eq!(model.numbers("qumax"), Some(&[0.8][..]));
    }

    #[test]
    fn test_beam_only_fields_zero_when_absent() {
        let symbols = vec!["Fe".to_string()];
        let model = encode(
            &db(),
            &symbols,
            &[],
            &[target_entry("Fe")],
            &single_layer(vec![1.0]),
            &RunParameters::default(),
        );
        assert_eq!(model.numbers("qubeam"), Some(&[0.0][..]));
        assert_eq!(model.numbers("e0"), Some(&[0.0][..]));
        assert_eq!(model.numbers("alpha0"), Some(&[0.0][..]));
        assert_eq!(model.numbers("qu"), Some(&[1.0][..]));
    }

    #[test]
    fn test_default_arrays_stay_empty() {
        let symbols = vec!["H".to_string(), "Fe".to_string()];
        let model = encode(
            &db(),
            &symbols,
            &[beam_entry("H")],
            &[target_entry("Fe")],
            &single_layer(vec![1.0]),
            &RunParameters::default(),
        );
        assert_eq!(model.numbers("dns0"), Some(&[][..]));
        assert_eq!(model.numbers("e_surfb"), Some(&[][..]));
        assert_eq!(model.numbers("e_displ"), Some(&[][..]));
    }

    #[test]
    fn test_customized_density_materializes_full_array() {
        let symbols = vec!["H".to_string(), "Fe".to_string()];
        let mut target = target_entry("Fe");
        target.atomic_density = 0.1;
        let model = encode(
            &db(),
            &symbols,
            &[beam_entry("H")],
            &[target],
            &single_layer(vec![1.0]),
            &RunParameters::default(),
        );
        let dns0 = model.numbers("dns0").unwrap();
        assert_eq!(dns0.len(), 2);
        assert_eq!(dns0[1], 0.1);
        // H keeps its database value in the materialized array
        let h_default = db().by_symbol("H").unwrap().atomic_density;
        assert_eq!(dns0[0], h_default);
        // The untouched arrays are still sparse
        assert_eq!(model.numbers("e_surfb"), Some(&[][..]));
    }

    #[test]
    fn test_layer_file_selector_and_rows() {
        let symbols = vec!["H".to_string(), "Fe".to_string(), "W".to_string()];
        let layers = vec![
            TargetLayer {
                segment_count: 50,
                segment_thickness: 2.0,
                abundances: vec![0.3, 0.7],
                name: "coating".to_string(),
            },
            TargetLayer {
                segment_count: 100,
                segment_thickness: 5.0,
                abundances: vec![0.0, 1.0],
                name: "bulk".to_string(),
            },
        ];
        let model = encode(
            &db(),
            &symbols,
            &[beam_entry("H")],
            &[target_entry("Fe"), target_entry("W")],
            &layers,
            &RunParameters::default(),
        );
        assert_eq!(model.scalar("iq0"), Some(-1.0));
        assert_eq!(model.layer_abundances[0], vec![0.0, 0.3, 0.7]);
        assert_eq!(model.layer_abundances[1], vec![0.0, 0.0, 1.0]);
        // qu comes from the first layer in target order
        assert_eq!(model.numbers("qu"), Some(&[0.0, 0.3, 0.7][..]));
    }

    #[test]
    fn test_scalars_copied_from_parameters() {
        let symbols = vec!["Fe".to_string()];
        let params = RunParameters {
            title: "scalar check".to_string(),
            histories: 500.0,
            fluence: 2.5,
            sweep_steps: 25.0,
            output_matrices: true,
            additional_settings: vec!["qu_int = 3".to_string()],
            ..RunParameters::default()
        };
        let model = encode(
            &db(),
            &symbols,
            &[],
            &[target_entry("Fe")],
            &single_layer(vec![1.0]),
            &params,
        );
        assert_eq!(model.title, "scalar check");
        assert_eq!(model.scalar("ncp"), Some(1.0));
        assert_eq!(model.scalar("nh"), Some(500.0));
        assert_eq!(model.scalar("flc"), Some(2.5));
        assert_eq!(model.scalar("number_calc"), Some(25.0));
        assert_eq!(model.boolean("lmatrices"), Some(true));
        assert_eq!(model.extra_lines, vec!["qu_int = 3".to_string()]);
    }

    #[test]
    fn test_unknown_element_everywhere_gets_registry_defaults() {
        let symbols = vec!["Fe".to_string(), "W".to_string()];
        let model = encode(
            &db(),
            &symbols,
            &[],
            &[target_entry("Fe")],
            &single_layer(vec![1.0]),
            &RunParameters::default(),
        );
        // W is in neither table: falls back to registry defaults and zeros
        assert_eq!(model.numbers("inel0"), Some(&[3.0, 3.0][..]));
        assert_eq!(model.numbers("qumax"), Some(&[1.0, 1.0][..]));
        assert_eq!(model.numbers("qu"), Some(&[1.0, 0.0][..]));
        assert_eq!(model.numbers("dns0"), Some(&[][..]));
    }
}
