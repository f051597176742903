//! Toolkit de conversión de formatos moleculares.
//!
//! Sustituto en Rust puro del toolkit nativo envuelto por el servicio:
//! parsers y escritores de xyz/cjson/smiles/inchi, propiedades (fórmula,
//! masa, conteo de átomos) y las opciones de conversión que acepta la API
//! (`gen3d`, `addHydrogens`, `perceiveBonds`).

pub mod elements;
pub mod formats;
pub mod toolkit;

pub use formats::{Atom, Bond, BondOrder, Molecule};
pub use toolkit::{ConversionEngine, ConvertOptions, Converted, Toolkit};
