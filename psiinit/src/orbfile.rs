//! Numerical atomic orbital files.
//!
//! ```text
//! ---------------------------------------------------------------------------
//! Element                     Si
//! Energy Cutoff(Ry)           100
//! Radius Cutoff(a.u.)         7
//! Lmax                        1
//! Number of Sorbital-->       2
//! Number of Porbital-->       1
//! ---------------------------------------------------------------------------
//! SUMMARY  END
//!
//! Mesh                        701
//! dr                          0.01
//!                 Type                   L                   N
//!                    0                   0                   0
//!    <Mesh amplitudes>
//!                 Type                   L                   N
//!                    0                   0                   1
//!    ...
//! ```
//!
//! The grid is r_i = i dr, i = 0 .. Mesh-1.

use crate::error::{PsiInitError, Result};
use crate::orbital::{AtomOrbitals, RadialOrbital};
use std::fs;
use std::str::FromStr;

const L_LABELS: [char; 7] = ['S', 'P', 'D', 'F', 'G', 'H', 'I'];

pub fn read_orb_file(species: &str, path: &str) -> Result<AtomOrbitals> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => {
            PsiInitError::Format(format!("orbital file '{}' is not valid text", path))
        }
        _ => PsiInitError::FileNotFound {
            path: path.to_string(),
        },
    })?;

    parse_orb(species, path, &text)
}

fn format_error(path: &str, msg: String) -> PsiInitError {
    PsiInitError::Format(format!("orbital file '{}': {}", path, msg))
}

fn parse_token<T: FromStr>(path: &str, what: &str, token: Option<&str>) -> Result<T> {
    let token = token.ok_or_else(|| format_error(path, format!("missing value for {}", what)))?;

    token
        .parse::<T>()
        .map_err(|_| format_error(path, format!("cannot parse '{}' as {}", token, what)))
}

pub fn parse_orb(species: &str, path: &str, text: &str) -> Result<AtomOrbitals> {
    let mut element = None;
    let mut lmax = None;
    let mut nchi_by_l: Vec<usize> = Vec::new();

    let mut lines = text.lines();
    let mut has_summary = false;

    for line in lines.by_ref() {
        let t = line.trim();

        if t.starts_with("SUMMARY") {
            has_summary = true;
            break;
        }

        if t.starts_with("Element") {
            element = Some(parse_token::<String>(path, "Element", t.split_whitespace().nth(1))?);
        } else if t.starts_with("Lmax") {
            lmax = Some(parse_token::<usize>(path, "Lmax", t.split_whitespace().nth(1))?);
        } else if t.starts_with("Number of") {
            let (label, count) = match t.split_once("-->") {
                Some(v) => v,
                None => return Err(format_error(path, format!("bad header line '{}'", t))),
            };

            let letter = label
                .trim()
                .trim_start_matches("Number of")
                .trim()
                .chars()
                .next()
                .unwrap_or(' ');

            let l = L_LABELS
                .iter()
                .position(|&c| c == letter)
                .ok_or_else(|| format_error(path, format!("unknown orbital label in '{}'", t)))?;

            let n = parse_token::<usize>(path, "orbital count", Some(count.trim()))?;

            if nchi_by_l.len() <= l {
                nchi_by_l.resize(l + 1, 0);
            }

            nchi_by_l[l] = n;
        }
    }

    if !has_summary {
        return Err(format_error(path, "no 'SUMMARY END' line".to_string()));
    }

    let element = element.ok_or_else(|| format_error(path, "no 'Element' line".to_string()))?;

    if let Some(lmax) = lmax {
        if nchi_by_l.len() > lmax + 1 && nchi_by_l[lmax + 1..].iter().any(|&n| n > 0) {
            return Err(format_error(
                path,
                format!("orbital counts declared beyond Lmax = {}", lmax),
            ));
        }
    }

    let body: Vec<&str> = lines.flat_map(|l| l.split_whitespace()).collect();
    let mut pos = 0;

    let mut expect = |word: &str, pos: &mut usize| -> Result<()> {
        if body.get(*pos) == Some(&word) {
            *pos += 1;
            Ok(())
        } else {
            Err(format_error(
                path,
                format!("expected '{}', found '{}'", word, body.get(*pos).unwrap_or(&"end of file")),
            ))
        }
    };

    expect("Mesh", &mut pos)?;
    let mesh: usize = parse_token(path, "Mesh", body.get(pos).copied())?;
    pos += 1;

    expect("dr", &mut pos)?;
    let dr: f64 = parse_token(path, "dr", body.get(pos).copied())?;
    pos += 1;

    if !(dr > 0.0) {
        return Err(PsiInitError::Value(format!(
            "orbital file '{}': dr = {} gives a radial grid that is not strictly increasing",
            path, dr
        )));
    }

    // every orbital carries `mesh` amplitudes, so a larger header value
    // cannot be honoured by the rest of the file
    if mesh > body.len() - pos {
        return Err(format_error(
            path,
            format!(
                "Mesh = {} but only {} tokens follow the header",
                mesh,
                body.len() - pos
            ),
        ));
    }

    let rgrid: Vec<f64> = (0..mesh).map(|i| i as f64 * dr).collect();

    let mut orbitals = Vec::new();
    let mut nread_by_l = vec![0; nchi_by_l.len()];

    while pos < body.len() {
        expect("Type", &mut pos)?;
        expect("L", &mut pos)?;
        expect("N", &mut pos)?;

        let _itype: usize = parse_token(path, "Type", body.get(pos).copied())?;
        let l: usize = parse_token(path, "L", body.get(pos + 1).copied())?;
        let zeta: usize = parse_token(path, "N", body.get(pos + 2).copied())?;
        pos += 3;

        let start = pos;
        while pos < body.len() && body[pos] != "Type" {
            pos += 1;
        }

        if pos - start != mesh {
            return Err(format_error(
                path,
                format!(
                    "orbital L = {} N = {} has {} values but Mesh declares {}",
                    l,
                    zeta,
                    pos - start,
                    mesh
                ),
            ));
        }

        let chi = body[start..pos]
            .iter()
            .map(|s| parse_token::<f64>(path, "orbital amplitude", Some(s)))
            .collect::<Result<Vec<f64>>>()?;

        if l >= nread_by_l.len() || nread_by_l[l] >= nchi_by_l[l] {
            return Err(format_error(
                path,
                format!("orbital L = {} N = {} is not declared in the header", l, zeta),
            ));
        }

        nread_by_l[l] += 1;

        orbitals.push(RadialOrbital::new(l, zeta, rgrid.clone(), chi)?);
    }

    if nread_by_l != nchi_by_l {
        return Err(format_error(
            path,
            format!(
                "header declares {:?} orbitals per l but the file holds {:?}",
                nchi_by_l, nread_by_l
            ),
        ));
    }

    AtomOrbitals::new(species, &element, path, orbitals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_orb(mesh: usize, dr: f64, orbitals: &[(usize, usize, usize)]) -> String {
        // orbitals: (l, zeta, number of values written)
        let mut s = String::new();

        s.push_str("---------------------------------------------------------------------------\n");
        s.push_str("Element                     O\n");
        s.push_str("Energy Cutoff(Ry)           100\n");
        s.push_str("Radius Cutoff(a.u.)         7\n");
        s.push_str("Lmax                        1\n");

        let ns = orbitals.iter().filter(|o| o.0 == 0).count();
        let np = orbitals.iter().filter(|o| o.0 == 1).count();

        s.push_str(&format!("Number of Sorbital-->       {}\n", ns));
        s.push_str(&format!("Number of Porbital-->       {}\n", np));
        s.push_str("---------------------------------------------------------------------------\n");
        s.push_str("SUMMARY  END\n\n");
        s.push_str(&format!("Mesh                        {}\n", mesh));
        s.push_str(&format!("dr                          {}\n", dr));

        for (l, zeta, nval) in orbitals.iter() {
            s.push_str("                Type                   L                   N\n");
            s.push_str(&format!("                   0                   {}                   {}\n", l, zeta));

            for i in 0..*nval {
                let r = i as f64 * dr;
                s.push_str(&format!(" {:.12e}", (-r * r).exp()));
                if i % 4 == 3 {
                    s.push('\n');
                }
            }
            s.push('\n');
        }

        s
    }

    #[test]
    fn test_parse_orb() {
        let text = make_orb(11, 0.1, &[(0, 0, 11), (0, 1, 11), (1, 0, 11)]);

        let atom = parse_orb("O1", "O.orb", &text).unwrap();

        assert_eq!(atom.get_species(), "O1");
        assert_eq!(atom.get_element(), "O");
        assert_eq!(atom.get_n_orbitals(), 3);
        assert_eq!(atom.get_nzeta(0), 2);
        assert_eq!(atom.get_nzeta(1), 1);

        let p = &atom.get_orbitals()[2];
        assert_eq!(p.get_l(), 1);
        assert_eq!(p.get_nr(), 11);
        assert!((p.get_rgrid()[10] - 1.0).abs() < 1.0e-14);
        assert!((p.get_chi()[10] - (-1.0f64).exp()).abs() < 1.0e-11);
    }

    #[test]
    fn test_point_count_mismatch_is_format_error() {
        let text = make_orb(11, 0.1, &[(0, 0, 11), (1, 0, 10)]);

        assert!(matches!(parse_orb("O", "O.orb", &text), Err(PsiInitError::Format(_))));
    }

    #[test]
    fn test_huge_mesh_is_format_error() {
        let text = make_orb(2, 0.1, &[(0, 0, 2)]).replace("Mesh                        2", "Mesh 100000000000000");

        assert!(matches!(parse_orb("O", "O.orb", &text), Err(PsiInitError::Format(_))));
    }

    #[test]
    fn test_nonpositive_dr_is_value_error() {
        let text = make_orb(5, 0.0, &[(0, 0, 5)]);

        assert!(matches!(parse_orb("O", "O.orb", &text), Err(PsiInitError::Value(_))));
    }

    #[test]
    fn test_header_errors() {
        assert!(matches!(
            parse_orb("O", "O.orb", "Element O\nMesh 3\n"),
            Err(PsiInitError::Format(_))
        ));

        let text = make_orb(5, 0.1, &[(0, 0, 5)]).replace("Element                     O\n", "");
        assert!(matches!(parse_orb("O", "O.orb", &text), Err(PsiInitError::Format(_))));

        // an orbital the header does not announce
        let text = make_orb(5, 0.1, &[(0, 0, 5)]).replace("Number of Sorbital-->       1", "Number of Sorbital-->       0");
        assert!(matches!(parse_orb("O", "O.orb", &text), Err(PsiInitError::Format(_))));
    }

    #[test]
    fn test_missing_file() {
        assert_eq!(
            read_orb_file("O", "/nonexistent/O.orb").unwrap_err(),
            PsiInitError::FileNotFound {
                path: "/nonexistent/O.orb".to_string()
            }
        );
    }
}
