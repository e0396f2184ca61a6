// Canonical blink waveform used for shape confirmation
//
// The reference waveform was averaged from recorded blinks on the target
// sensor and amplitude-normalized to [0, 1]. It peaks at its center
// sample, which is what lets the matcher test shape at a fixed alignment
// instead of searching over temporal offsets.

use serde::{Deserialize, Serialize};

use crate::error::{BlinkError, Result};

/// Length of the canonical template (and therefore of every match window).
pub const TEMPLATE_LEN: usize = 201;

/// One canonical blink shape, amplitude-normalized to [0, 1].
const IDEAL_BLINK: [f64; TEMPLATE_LEN] = [
    0.012790146849834212, 0.0123164377072469, 0.008526764566556141,
    0.011842728564659585, 0.005684509711037428, 0.007579346281381514,
    0.0123164377072469, 0.010895310279487543, 0.01847465656087164,
    0.006631927996209471, 0.009474182851728186, 0.008526764566556141,
    0.006631927996209471, 0.005684509711037428, 0.008053055423968829,
    0.011842728564659585, 0.0023685457129314, 0.008526764566556141,
    0.009474182851728186, 0.011842728564659585, 0.0,
    0.008526764566556141, 0.006631927996209471, 0.013737565135006256,
    0.013263855992418942, 0.009947891994315498, 0.007579346281381514,
    0.005684509711037428, 0.009947891994315498, 0.011369019422074855,
    0.001894836570344086, 0.008053055423968829, 0.011842728564659585,
    0.010421601136900228, 0.008526764566556141, 0.0023685457129314,
    0.006631927996209471, 0.009000473709140871, 0.002842254855518714,
    0.010421601136900228, 0.006631927996209471, 0.0047370914258628,
    0.010421601136900228, 0.010895310279487543, 0.010421601136900228,
    0.007579346281381514, 0.009947891994315498, 0.005684509711037428,
    0.0061582188536221565, 0.004263382283278071, 0.009474182851728186,
    0.008053055423968829, 0.010421601136900228, 0.010421601136900228,
    0.0123164377072469, 0.008526764566556141, 0.009474182851728186,
    0.013263855992418942, 0.016106110847937657, 0.010421601136900228,
    0.014684983420178299, 0.012790146849834212, 0.012790146849834212,
    0.01657981999052497, 0.010895310279487543, 0.019895783988630997,
    0.017527238275697014, 0.020369493131215728, 0.024159166271909067,
    0.027475130270012513, 0.036001894836568654, 0.04121269540502135,
    0.06537186167693042, 0.07768829938417732, 0.10042633822832703,
    0.12363808621506406, 0.15348176219801055, 0.18569398389388844,
    0.23164377072477518, 0.2539081004263376, 0.30270014211274304,
    0.34201800094741774, 0.3846518237801984, 0.42728564661297913,
    0.47702510658455666, 0.5300805305542402, 0.577925153955471,
    0.6205589767882517, 0.6674561819043104, 0.7171956418758879,
    0.7550923732828033, 0.7981999052581713, 0.836570345807674,
    0.8668877309332078, 0.8986262434864983, 0.9199431549028887,
    0.941260066319279, 0.9597347228801507, 0.9711037423022255,
    0.9748934154429189, 1.0, 0.9853150165798191,
    0.9810516342965411, 0.9729985788725722, 0.9663666508763628,
    0.9549976314542878, 0.9426811937470384, 0.9275225011842728,
    0.9071530080530544, 0.9043107531975357, 0.8882046423495981,
    0.8630980577925144, 0.8526764566556142, 0.8389388915206053,
    0.8162008526764556, 0.796778777830412, 0.7759355755566089,
    0.7588820464234967, 0.7385125532922783, 0.7261961155850314,
    0.7096162955945039, 0.6920890573188069, 0.6721932733301759,
    0.6537186167693042, 0.6385599242065361, 0.6191378493604923,
    0.601136901942208, 0.5897678825201331, 0.5712932259592615,
    0.5523448602558025, 0.5409758408337277, 0.5296068214116528,
    0.5187115111321653, 0.501657981999053, 0.4860255802937001,
    0.47702510658455666, 0.4642349597347224, 0.4519185220274755,
    0.43770724774988196, 0.4258645191852198, 0.4135480814779729,
    0.39696826148744535, 0.3912837517764079, 0.3784936049265737,
    0.35765040265277065, 0.35480814779725195, 0.33538607295120826,
    0.3306489815253429, 0.3197536712458553, 0.30743723353860586,
    0.30743723353860586, 0.29559450497394624, 0.2913311226906682,
    0.2861203221222155, 0.2700142112742778, 0.2719090478446219,
    0.25580293699668427, 0.25248697299857825, 0.24538133585978145,
    0.23827569872098467, 0.23211747986735992, 0.22595926101373776,
    0.216485078162007, 0.2145902415916629, 0.2093794410232102,
    0.2046423495973474, 0.19753671245855062, 0.19516816674561663,
    0.19137849360492587, 0.18190431075319768, 0.1847465656087164,
    0.17621980104216026, 0.16011369019422003, 0.16153481762197938,
    0.1572714353387013, 0.15300805305542323, 0.1496920890573172,
    0.14637612505921377, 0.14163903363334837, 0.14163903363334837,
    0.13121743249644557, 0.1269540502131675, 0.12648034107058276,
    0.12742775935575482, 0.1245855045002361, 0.12126954050213007,
    0.12553292278540815, 0.11937470393178598, 0.12032212221695802,
    0.11890099478919867, 0.11179535765040188, 0.11084793936522984,
    0.10990052108005521, 0.10326859308384574, 0.10563713879677715,
    0.1070582662245365, 0.10753197536712382, 0.09853150165798036,
    0.09758408337280831, 0.09900521080056768, 0.09616295594504896,
];

/// An immutable normalized reference waveform.
///
/// Values lie in [0, 1] and the length is odd so the window has a center
/// sample to align on. Process-wide, a template is built once at startup
/// and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    values: Vec<f64>,
}

impl Template {
    /// The built-in canonical blink shape.
    pub fn ideal() -> Self {
        Self {
            values: IDEAL_BLINK.to_vec(),
        }
    }

    /// Build a custom template, validating the normalization contract.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        if values.len() < 3 {
            return Err(BlinkError::InvalidTemplate(format!(
                "template needs at least 3 samples, got {}",
                values.len()
            )));
        }
        if values.len() % 2 == 0 {
            return Err(BlinkError::InvalidTemplate(format!(
                "template length must be odd so a center sample exists, got {}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite() || *v < 0.0 || *v > 1.0) {
            return Err(BlinkError::InvalidTemplate(
                "template values must be finite and within [0, 1]".to_string(),
            ));
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max <= min {
            return Err(BlinkError::InvalidTemplate(
                "template must have amplitude variation".to_string(),
            ));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Samples on each side of the window center.
    pub fn half_window(&self) -> usize {
        (self.values.len() - 1) / 2
    }

    /// Index of the template maximum.
    pub fn peak_index(&self) -> usize {
        self.values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}
