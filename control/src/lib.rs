use dwconsts::*;

use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    str::FromStr,
};

const INIT_WFC_SCHEMES: [&str; 5] = ["nao", "nao+random", "atomic", "atomic+random", "random"];
const SPLINE_BCS: [&str; 2] = ["natural", "periodic"];
const PHASE_CONVENTIONS: [&str; 2] = ["kg", "g"];
const VERBOSITIES: [&str; 2] = ["normal", "high"];

#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    Io { path: String, message: String },
    UnknownParameter { line: String },
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::Io { path, message } => {
                write!(f, "cannot read control file '{}': {}", path, message)
            }
            ControlError::UnknownParameter { line } => write!(f, "unknown parameter : {}", line),
            ControlError::InvalidValue { key, value } => {
                write!(f, "invalid value '{}' for parameter '{}'", value, key)
            }
        }
    }
}

impl std::error::Error for ControlError {}

#[derive(Debug, Clone)]
pub struct Control {
    verbosity: String,

    init_wfc: String,
    nband: usize,
    ecut_wfc: f64, // hartree

    nao_dq: f64,
    nao_qmax: Option<f64>,
    nao_spline_bc: String,
    nao_normalize: bool,

    random_seed: u64,
    random_mix: f64,
    fill_unprojected: bool,

    phase_convention: String,

    orbital_files: Vec<(String, String)>, // (species, path)
}

impl Default for Control {
    fn default() -> Control {
        Control::new()
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ControlError> {
    value.parse::<T>().map_err(|_| ControlError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_choice(key: &str, value: &str, choices: &[&str]) -> Result<String, ControlError> {
    let v = value.trim().to_lowercase();

    if choices.contains(&v.as_str()) {
        Ok(v)
    } else {
        Err(ControlError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find(|c| c == '#' || c == '!') {
        Some(i) => &line[..i],
        None => line,
    }
}

impl Control {
    pub fn new() -> Control {
        Control {
            verbosity: "normal".to_string(),

            init_wfc: "nao".to_string(),
            nband: 8,
            ecut_wfc: 20.0,

            nao_dq: 0.01,
            nao_qmax: None,
            nao_spline_bc: "natural".to_string(),
            nao_normalize: false,

            random_seed: 1,
            random_mix: 0.05,
            fill_unprojected: true,

            phase_convention: "kg".to_string(),

            orbital_files: Vec::new(),
        }
    }

    pub fn get_verbosity(&self) -> &str {
        &self.verbosity
    }

    pub fn is_verbose(&self) -> bool {
        "high" == self.verbosity
    }

    pub fn get_init_wfc(&self) -> &str {
        &self.init_wfc
    }

    pub fn get_nband(&self) -> usize {
        self.nband
    }

    /// In hartree.
    pub fn get_ecut(&self) -> f64 {
        self.ecut_wfc
    }

    pub fn get_nao_dq(&self) -> f64 {
        self.nao_dq
    }

    /// Upper end of the reciprocal-space table; defaults to sqrt(2 ecut) + 4 dq.
    pub fn get_nao_qmax(&self) -> f64 {
        match self.nao_qmax {
            Some(q) => q,
            None => (2.0 * self.ecut_wfc).sqrt() + 4.0 * self.nao_dq,
        }
    }

    pub fn get_nao_spline_bc(&self) -> &str {
        &self.nao_spline_bc
    }

    pub fn get_nao_normalize(&self) -> bool {
        self.nao_normalize
    }

    pub fn get_random_seed(&self) -> u64 {
        self.random_seed
    }

    pub fn get_random_mix(&self) -> f64 {
        self.random_mix
    }

    pub fn get_fill_unprojected(&self) -> bool {
        self.fill_unprojected
    }

    pub fn get_phase_convention(&self) -> &str {
        &self.phase_convention
    }

    pub fn get_orbital_files(&self) -> &[(String, String)] {
        &self.orbital_files
    }

    pub fn set_init_wfc(&mut self, scheme: &str) -> Result<(), ControlError> {
        self.init_wfc = parse_choice("init_wfc", scheme, &INIT_WFC_SCHEMES)?;

        Ok(())
    }

    pub fn set_nband(&mut self, nband: usize) {
        self.nband = nband;
    }

    pub fn set_random_seed(&mut self, seed: u64) {
        self.random_seed = seed;
    }

    pub fn add_orbital_file(&mut self, species: &str, path: &str) {
        self.orbital_files
            .push((species.to_string(), path.to_string()));
    }

    pub fn read_file(&mut self, inpfile: &str) -> Result<(), ControlError> {
        let lines = read_file_data_to_vec(inpfile)?;

        self.parse_lines(&lines)?;

        log::info!("control parameters read from {}", inpfile);

        Ok(())
    }

    pub fn parse_str(&mut self, text: &str) -> Result<(), ControlError> {
        let lines: Vec<String> = text.lines().map(|s| s.to_string()).collect();

        self.parse_lines(&lines)
    }

    fn parse_lines(&mut self, lines: &[String]) -> Result<(), ControlError> {
        for line in lines.iter() {
            let body = strip_comment(line);

            if body.trim().is_empty() {
                continue;
            }

            let s: Vec<&str> = body.splitn(2, '=').map(|x| x.trim()).collect();

            if s.len() != 2 {
                return Err(ControlError::UnknownParameter {
                    line: line.trim().to_string(),
                });
            }

            let (key, value) = (s[0], s[1]);

            match key {
                "verbosity" => {
                    self.verbosity = parse_choice(key, value, &VERBOSITIES)?;
                }

                "init_wfc" => {
                    self.init_wfc = parse_choice(key, value, &INIT_WFC_SCHEMES)?;
                }

                "nband" => {
                    self.nband = parse_value(key, value)?;
                }

                "ecut_wfc" => {
                    self.ecut_wfc = parse_value::<f64>(key, value)? * EV_TO_HA;
                }

                "nao_dq" => {
                    let dq: f64 = parse_value(key, value)?;

                    if dq <= 0.0 {
                        return Err(ControlError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                    }

                    self.nao_dq = dq;
                }

                "nao_qmax" => {
                    let qmax: f64 = parse_value(key, value)?;

                    if qmax <= 0.0 {
                        return Err(ControlError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                    }

                    self.nao_qmax = Some(qmax);
                }

                "nao_spline_bc" => {
                    self.nao_spline_bc = parse_choice(key, value, &SPLINE_BCS)?;
                }

                "nao_normalize" => {
                    self.nao_normalize = parse_value(key, value)?;
                }

                "random_seed" => {
                    self.random_seed = parse_value(key, value)?;
                }

                "random_mix" => {
                    self.random_mix = parse_value(key, value)?;
                }

                "fill_unprojected" => {
                    self.fill_unprojected = parse_value(key, value)?;
                }

                "phase_convention" => {
                    self.phase_convention = parse_choice(key, value, &PHASE_CONVENTIONS)?;
                }

                "orbital_file" => {
                    let v: Vec<&str> = value.split_whitespace().collect();

                    if v.len() != 2 {
                        return Err(ControlError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                    }

                    self.add_orbital_file(v[0], v[1]);
                }

                _ => {
                    return Err(ControlError::UnknownParameter {
                        line: line.trim().to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn display(&self) {
        const OUT_WIDTH1: usize = 28;
        const OUT_WIDTH2: usize = 18;

        println!("   {:-^80}", " control parameters ");
        println!();

        println!(
            "   {:<width1$} = {:>width2$}",
            "init_wfc",
            self.get_init_wfc(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "nband",
            self.get_nband(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$.3} eV",
            "ecut",
            self.get_ecut() * HA_TO_EV,
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$.4} 1/bohr",
            "nao_dq",
            self.get_nao_dq(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$.4} 1/bohr",
            "nao_qmax",
            self.get_nao_qmax(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "nao_spline_bc",
            self.get_nao_spline_bc(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "nao_normalize",
            self.get_nao_normalize(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "phase_convention",
            self.get_phase_convention(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "random_seed",
            self.get_random_seed(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "random_mix",
            self.get_random_mix(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "fill_unprojected",
            self.get_fill_unprojected(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        for (species, path) in self.orbital_files.iter() {
            println!(
                "   {:<width1$} = {:>width2$} {}",
                "orbital_file",
                species,
                path,
                width1 = OUT_WIDTH1,
                width2 = OUT_WIDTH2
            );
        }

        println!();
    }
}

pub fn read_file_data_to_vec(inpfile: &str) -> Result<Vec<String>, ControlError> {
    let file = File::open(inpfile).map_err(|e| ControlError::Io {
        path: inpfile.to_string(),
        message: e.to_string(),
    })?;

    let lines = BufReader::new(file).lines();

    lines
        .collect::<std::io::Result<Vec<String>>>()
        .map_err(|e| ControlError::Io {
            path: inpfile.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let control = Control::new();

        assert_eq!(control.get_init_wfc(), "nao");
        assert_eq!(control.get_nband(), 8);
        assert!((control.get_ecut() - 20.0).abs() < 1.0e-12);
        assert!((control.get_nao_qmax() - (40.0f64.sqrt() + 0.04)).abs() < 1.0e-12);
        assert_eq!(control.get_phase_convention(), "kg");
        assert!(control.get_fill_unprojected());
        assert!(control.get_orbital_files().is_empty());
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();

        writeln!(file, "# initial wavefunctions").unwrap();
        writeln!(file, "init_wfc = NAO+random").unwrap();
        writeln!(file, "nband = 12   ! bands").unwrap();
        writeln!(file, "ecut_wfc = 272.11396132").unwrap();
        writeln!(file, "nao_dq = 0.02").unwrap();
        writeln!(file, "nao_qmax = 9.5").unwrap();
        writeln!(file, "nao_spline_bc = periodic").unwrap();
        writeln!(file, "phase_convention = g").unwrap();
        writeln!(file, "random_seed = 7").unwrap();
        writeln!(file, "orbital_file = Si  Si_gga_7au_100Ry_2s2p1d.orb").unwrap();
        writeln!(file, "orbital_file = O O_gga_6au_100Ry_2s2p1d.orb").unwrap();
        writeln!(file).unwrap();

        let mut control = Control::new();
        control
            .read_file(file.path().to_str().unwrap())
            .unwrap();

        assert_eq!(control.get_init_wfc(), "nao+random");
        assert_eq!(control.get_nband(), 12);
        assert!((control.get_ecut() - 10.0).abs() < 1.0e-6);
        assert!((control.get_nao_qmax() - 9.5).abs() < 1.0e-12);
        assert_eq!(control.get_nao_spline_bc(), "periodic");
        assert_eq!(control.get_phase_convention(), "g");
        assert_eq!(control.get_random_seed(), 7);
        assert_eq!(
            control.get_orbital_files(),
            &[
                ("Si".to_string(), "Si_gga_7au_100Ry_2s2p1d.orb".to_string()),
                ("O".to_string(), "O_gga_6au_100Ry_2s2p1d.orb".to_string())
            ]
        );
    }

    #[test]
    fn test_errors() {
        let mut control = Control::new();

        assert!(matches!(
            control.parse_str("scf_max_iter = 3"),
            Err(ControlError::UnknownParameter { .. })
        ));

        assert_eq!(
            control.parse_str("nband = many"),
            Err(ControlError::InvalidValue {
                key: "nband".to_string(),
                value: "many".to_string()
            })
        );

        assert!(matches!(
            control.parse_str("init_wfc = file"),
            Err(ControlError::InvalidValue { .. })
        ));

        assert!(matches!(
            control.parse_str("orbital_file = Si"),
            Err(ControlError::InvalidValue { .. })
        ));

        assert!(matches!(
            control.read_file("/nonexistent/in.ctrl"),
            Err(ControlError::Io { .. })
        ));
    }
}
