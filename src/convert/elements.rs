//! Tabla periódica mínima: símbolos, masas atómicas medias, radios
//! covalentes y valencias típicas para los elementos que manejan los
//! formatos soportados (Z = 1..=54 más I dentro del rango).

/// Número atómico más alto soportado.
pub const MAX_Z: u8 = 54;

#[rustfmt::skip]
static SYMBOLS: [&str; MAX_Z as usize] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe",
];

#[rustfmt::skip]
static MASSES: [f64; MAX_Z as usize] = [
    1.008, 4.0026, 6.94, 9.0122, 10.81, 12.011, 14.007, 15.999, 18.998, 20.180,
    22.990, 24.305, 26.982, 28.085, 30.974, 32.06, 35.45, 39.948, 39.098, 40.078,
    44.956, 47.867, 50.942, 51.996, 54.938, 55.845, 58.933, 58.693, 63.546, 65.38,
    69.723, 72.630, 74.922, 78.971, 79.904, 83.798, 85.468, 87.62, 88.906, 91.224,
    92.906, 95.95, 97.0, 101.07, 102.91, 106.42, 107.87, 112.41, 114.82, 118.71,
    121.76, 127.60, 126.90, 131.29,
];

/// Radios covalentes (Å) para percepción de enlaces por distancia.
#[rustfmt::skip]
static COVALENT_RADII: [f64; MAX_Z as usize] = [
    0.31, 0.28, 1.28, 0.96, 0.84, 0.76, 0.71, 0.66, 0.57, 0.58,
    1.66, 1.41, 1.21, 1.11, 1.07, 1.05, 1.02, 1.06, 2.03, 1.76,
    1.70, 1.60, 1.53, 1.39, 1.39, 1.32, 1.26, 1.24, 1.32, 1.22,
    1.22, 1.20, 1.19, 1.20, 1.20, 1.16, 2.20, 1.95, 1.90, 1.75,
    1.64, 1.54, 1.47, 1.46, 1.42, 1.39, 1.45, 1.44, 1.42, 1.39,
    1.39, 1.38, 1.39, 1.40,
];

/// Número atómico de un símbolo (sensible a mayúsculas: "Cl", no "CL").
pub fn atomic_number(symbol: &str) -> Option<u8> {
    SYMBOLS.iter().position(|s| *s == symbol).map(|i| (i + 1) as u8)
}

/// Símbolo de un número atómico dentro de la tabla.
pub fn symbol(z: u8) -> Option<&'static str> {
    if z == 0 || z > MAX_Z {
        return None;
    }
    Some(SYMBOLS[(z - 1) as usize])
}

/// Masa atómica media (uma); 0.0 fuera de tabla.
pub fn mass(z: u8) -> f64 {
    if z == 0 || z > MAX_Z {
        return 0.0;
    }
    MASSES[(z - 1) as usize]
}

/// Radio covalente (Å); valor genérico fuera de tabla.
pub fn covalent_radius(z: u8) -> f64 {
    if z == 0 || z > MAX_Z {
        return 1.5;
    }
    COVALENT_RADII[(z - 1) as usize]
}

/// Valencia típica para saturar con hidrógenos; None cuando el elemento no
/// tiene una valencia orgánica habitual.
pub fn typical_valence(z: u8) -> Option<u8> {
    match z {
        1 => Some(1),   // H
        5 => Some(3),   // B
        6 => Some(4),   // C
        7 => Some(3),   // N
        8 => Some(2),   // O
        9 => Some(1),   // F
        15 => Some(3),  // P
        16 => Some(2),  // S
        17 => Some(1),  // Cl
        35 => Some(1),  // Br
        53 => Some(1),  // I
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_round_trip() {
        for z in 1..=MAX_Z {
            let sym = symbol(z).unwrap();
            assert_eq!(atomic_number(sym), Some(z));
        }
    }

    #[test]
    fn test_common_masses() {
        assert!((mass(1) - 1.008).abs() < 1e-9);
        assert!((mass(6) - 12.011).abs() < 1e-9);
        assert!((mass(8) - 15.999).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_table() {
        assert_eq!(symbol(0), None);
        assert_eq!(symbol(MAX_Z + 1), None);
        assert_eq!(atomic_number("Xx"), None);
        assert_eq!(mass(200), 0.0);
    }

    #[test]
    fn test_valences() {
        assert_eq!(typical_valence(6), Some(4));
        assert_eq!(typical_valence(8), Some(2));
        assert_eq!(typical_valence(10), None);
    }
}
