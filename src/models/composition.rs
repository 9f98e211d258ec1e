//! Domain input types supplied by the composition tables of a front-end.

use serde::{Deserialize, Serialize};

/// One element of the projectile beam composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamComponent {
    /// Element symbol
    pub symbol: String,
    /// Fraction of this element in the beam (0..1)
    pub abundance: f64,
    /// Kinetic energy in eV
    pub kin_energy: f64,
    /// Incidence angle in degrees
    pub angle: f64,
    /// Maximum allowed concentration in the target
    pub max_concentration: f64,
    /// Atomic density in atoms/A^3
    pub atomic_density: f64,
    /// Surface binding energy in eV
    pub surf_bind_energy: f64,
    /// Displacement energy in eV
    pub displ_energy: f64,
    /// Inelastic loss model selector (1..6)
    pub inel_loss_model: u8,
}

/// One element of the target composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetComponent {
    /// Element symbol
    pub symbol: String,
    /// Maximum allowed concentration in the target
    pub max_concentration: f64,
    /// Atomic density in atoms/A^3
    pub atomic_density: f64,
    /// Surface binding energy in eV
    pub surf_bind_energy: f64,
    /// Displacement energy in eV
    pub displ_energy: f64,
    /// Inelastic loss model selector (1..6)
    pub inel_loss_model: u8,
}

/// One layer of the target, as written to the layers file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetLayer {
    /// Number of depth segments in this layer
    pub segment_count: u32,
    /// Thickness of a single segment in Angstrom
    pub segment_thickness: f64,
    /// Abundance per target-composition entry, in target order
    pub abundances: Vec<f64>,
    /// Layer name
    pub name: String,
}

impl TargetLayer {
    /// Total layer thickness as persisted in the layers file.
    #[must_use]
    pub fn thickness(&self) -> f64 {
        f64::from(self.segment_count) * self.segment_thickness
    }
}

/// Scalar run parameters supplied by the caller, copied into the model
/// unchanged by the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Title line of the input file
    pub title: String,
    /// Histories per fluence update (`nh`)
    pub histories: f64,
    /// Histories between outputs (`idout`)
    pub histories_between_outputs: f64,
    /// Projectiles per history (`nr_pproj`)
    pub projectiles_per_history: f64,
    /// Fluence (`flc`)
    pub fluence: f64,
    /// Relaxation-mode selector (`idrel`)
    pub calc_method: f64,
    /// Interaction-potential selector (`ipot`)
    pub interact_potential: f64,
    /// Integration-method selector (`iintegral`)
    pub integration_method: f64,
    /// Surface-binding-model selector (`isbv`)
    pub surface_binding_model: f64,
    /// Kinetic-energy case selector (`case_e0`)
    pub kin_energy_type: f64,
    /// Incidence-angle case selector (`case_alpha`)
    pub angle_type: f64,
    /// Number of runs in a parametric sweep (`number_calc`)
    pub sweep_steps: f64,
    /// Target thickness in Angstrom (`ttarget`)
    pub target_thickness: f64,
    /// Number of target depth segments (`nqx`)
    pub target_segments: f64,
    /// Whether a single global density overrides per-element densities
    pub global_density_enabled: bool,
    /// The global density value
    pub global_density: f64,
    /// Track reflected projectiles in the output (`lparticle_p`)
    pub output_reflected: bool,
    /// Track sputtered recoils in the output (`lparticle_r`)
    pub output_sputtered: bool,
    /// Write matrix output files (`lmatrices`)
    pub output_matrices: bool,
    /// Free-form settings lines appended verbatim to the input file
    pub additional_settings: Vec<String>,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            title: String::new(),
            histories: 1000.0,
            histories_between_outputs: -1.0,
            projectiles_per_history: 10.0,
            fluence: 1.0,
            calc_method: 1.0,
            interact_potential: 1.0,
            integration_method: 2.0,
            surface_binding_model: 1.0,
            kin_energy_type: 0.0,
            angle_type: 0.0,
            sweep_steps: 19.0,
            target_thickness: 2000.0,
            target_segments: 200.0,
            global_density_enabled: false,
            global_density: 0.0,
            output_reflected: false,
            output_sputtered: false,
            output_matrices: false,
            additional_settings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_thickness() {
        let layer = TargetLayer {
            segment_count: 50,
            segment_thickness: 0.2,
            abundances: vec![1.0],
            name: "bulk".to_string(),
        };
        assert!((layer.thickness() - 10.0).abs() < 1e-12);
    }
}
