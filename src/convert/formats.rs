//! Representación interna de moléculas y parsers/escritores de formatos.
//!
//! Soporta xyz (geometría cartesiana), cjson (chemical JSON), un subconjunto
//! de SMILES (átomos orgánicos, corchetes, ramas, anillos, aromaticidad) y
//! la capa de fórmula de InChI. Los hidrógenos implícitos de SMILES se
//! materializan al parsear, de modo que fórmula y masa salen completas.
use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Value};

use super::elements;
use crate::errors::server_error::ConvertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Contribución a la valencia del átomo.
    pub fn valence(&self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
        }
    }

    /// Orden entero para formatos que no representan aromaticidad.
    pub fn integer(&self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub atomic_number: u8,
    pub position: Option<[f64; 3]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
}

impl Molecule {
    pub fn has_coords(&self) -> bool {
        !self.atoms.is_empty() && self.atoms.iter().all(|a| a.position.is_some())
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| a.atomic_number != 1).count()
    }

    pub fn mass(&self) -> f64 {
        self.atoms.iter().map(|a| elements::mass(a.atomic_number)).sum()
    }

    fn formula_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for atom in &self.atoms {
            if let Some(sym) = elements::symbol(atom.atomic_number) {
                *counts.entry(sym).or_insert(0) += 1;
            }
        }
        counts
    }

    fn hill_ordered(&self) -> Vec<(&'static str, usize)> {
        let mut counts = self.formula_counts();
        let mut ordered = Vec::new();
        // Orden de Hill: C primero, H después, resto alfabético. Sin
        // carbono, todo alfabético.
        if let Some(c) = counts.remove("C") {
            ordered.push(("C", c));
            if let Some(h) = counts.remove("H") {
                ordered.push(("H", h));
            }
        }
        ordered.extend(counts.into_iter());
        ordered
    }

    /// Fórmula en orden de Hill ("C2H6O").
    pub fn hill_formula(&self) -> String {
        let mut out = String::new();
        for (sym, count) in self.hill_ordered() {
            out.push_str(sym);
            if count > 1 {
                out.push_str(&count.to_string());
            }
        }
        out
    }

    /// Fórmula espaciada ("C 2 H 6 O 1").
    pub fn spaced_formula(&self) -> String {
        let parts: Vec<String> =
            self.hill_ordered().into_iter().map(|(sym, count)| format!("{sym} {count}")).collect();
        parts.join(" ")
    }

    fn bond_order_sum(&self, atom: usize) -> f64 {
        self.bonds
            .iter()
            .filter(|b| b.a == atom || b.b == atom)
            .map(|b| b.order.valence())
            .sum()
    }

    /// Añade hidrógenos explícitos hasta la valencia típica de cada átomo
    /// pesado. Sólo tiene sentido cuando hay información de enlaces.
    pub fn add_hydrogens(&mut self) {
        if self.bonds.is_empty() {
            return;
        }
        let heavy = self.atoms.len();
        for i in 0..heavy {
            let z = self.atoms[i].atomic_number;
            if z == 1 {
                continue;
            }
            let Some(valence) = elements::typical_valence(z) else { continue };
            let missing = (f64::from(valence) - self.bond_order_sum(i)).floor();
            for _ in 0..missing.max(0.0) as usize {
                let h = self.atoms.len();
                self.atoms.push(Atom { atomic_number: 1, position: None });
                self.bonds.push(Bond { a: i, b: h, order: BondOrder::Single });
            }
        }
    }

    /// Percepción de enlaces por umbral de distancia sobre radios
    /// covalentes. Reemplaza los enlaces existentes.
    pub fn perceive_bonds(&mut self) -> Result<(), ConvertError> {
        if !self.has_coords() {
            return Err(ConvertError::NoCoordinates);
        }
        self.bonds.clear();
        for i in 0..self.atoms.len() {
            for j in (i + 1)..self.atoms.len() {
                let pi = self.atoms[i].position.unwrap_or_default();
                let pj = self.atoms[j].position.unwrap_or_default();
                let d2: f64 =
                    (0..3).map(|k| (pi[k] - pj[k]) * (pi[k] - pj[k])).sum();
                let cutoff = 1.3
                    * (elements::covalent_radius(self.atoms[i].atomic_number)
                        + elements::covalent_radius(self.atoms[j].atomic_number));
                if d2.sqrt() <= cutoff {
                    self.bonds.push(Bond { a: i, b: j, order: BondOrder::Single });
                }
            }
        }
        Ok(())
    }

    /// Geometría 3D de partida: átomos espaciados sobre una recta. El
    /// refinamiento por campo de fuerzas queda fuera de alcance; los
    /// parámetros se aceptan por compatibilidad de API.
    pub fn generate_coords(&mut self, _forcefield: &str, _steps: u32) {
        for (i, atom) in self.atoms.iter_mut().enumerate() {
            if atom.position.is_none() {
                atom.position = Some([1.5 * i as f64, 0.0, 0.0]);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// xyz

pub fn parse_xyz(data: &str) -> Result<Molecule, ConvertError> {
    let err = |message: &str| ConvertError::Parse { format: "xyz".into(), message: message.into() };
    let mut lines = data.lines();
    let count: usize = lines
        .next()
        .ok_or_else(|| err("empty input"))?
        .trim()
        .parse()
        .map_err(|_| err("first line must be the atom count"))?;
    let _comment = lines.next().ok_or_else(|| err("missing comment line"))?;

    let mut atoms = Vec::with_capacity(count);
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(err("atom lines must be: symbol x y z"));
        }
        let z = elements::atomic_number(fields[0])
            .ok_or_else(|| ConvertError::UnknownElement(fields[0].to_string()))?;
        let mut pos = [0.0f64; 3];
        for (k, field) in fields[1..].iter().enumerate() {
            pos[k] = field.parse().map_err(|_| err("bad coordinate"))?;
        }
        atoms.push(Atom { atomic_number: z, position: Some(pos) });
    }
    if atoms.len() != count {
        return Err(err("atom count does not match header"));
    }
    Ok(Molecule { atoms, bonds: Vec::new() })
}

pub fn to_xyz(mol: &Molecule) -> Result<String, ConvertError> {
    if !mol.has_coords() {
        return Err(ConvertError::NoCoordinates);
    }
    let mut out = format!("{}\n{}\n", mol.atoms.len(), mol.hill_formula());
    for atom in &mol.atoms {
        let sym = elements::symbol(atom.atomic_number)
            .ok_or_else(|| ConvertError::UnknownElement(atom.atomic_number.to_string()))?;
        let p = atom.position.unwrap_or_default();
        out.push_str(&format!("{sym} {:.6} {:.6} {:.6}\n", p[0], p[1], p[2]));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// cjson

pub fn parse_cjson(data: &str) -> Result<Molecule, ConvertError> {
    let err = |message: String| ConvertError::Parse { format: "cjson".into(), message };
    let doc: Value =
        serde_json::from_str(data).map_err(|e| err(format!("invalid JSON: {e}")))?;

    let numbers = doc
        .pointer("/atoms/elements/number")
        .and_then(Value::as_array)
        .ok_or_else(|| err("missing atoms.elements.number".into()))?;
    let mut atoms = Vec::with_capacity(numbers.len());
    for n in numbers {
        let z = n.as_u64().and_then(|v| u8::try_from(v).ok());
        let z = z.ok_or_else(|| err("atomic number out of range".into()))?;
        atoms.push(Atom { atomic_number: z, position: None });
    }

    if let Some(coords) = doc.pointer("/atoms/coords/3d").and_then(Value::as_array) {
        if coords.len() != atoms.len() * 3 {
            return Err(err("coords.3d length must be 3 * atom count".into()));
        }
        for (i, atom) in atoms.iter_mut().enumerate() {
            let mut pos = [0.0f64; 3];
            for k in 0..3 {
                pos[k] = coords[3 * i + k]
                    .as_f64()
                    .ok_or_else(|| err("non-numeric coordinate".into()))?;
            }
            atom.position = Some(pos);
        }
    }

    let mut bonds = Vec::new();
    if let Some(index) = doc.pointer("/bonds/connections/index").and_then(Value::as_array) {
        if index.len() % 2 != 0 {
            return Err(err("bonds.connections.index must be pairs".into()));
        }
        let orders = doc.pointer("/bonds/order").and_then(Value::as_array);
        for pair in 0..index.len() / 2 {
            let a = index[2 * pair].as_u64().unwrap_or(u64::MAX) as usize;
            let b = index[2 * pair + 1].as_u64().unwrap_or(u64::MAX) as usize;
            if a >= atoms.len() || b >= atoms.len() {
                return Err(err("bond index out of range".into()));
            }
            let order = orders
                .and_then(|o| o.get(pair))
                .and_then(Value::as_u64)
                .unwrap_or(1);
            let order = match order {
                2 => BondOrder::Double,
                3 => BondOrder::Triple,
                _ => BondOrder::Single,
            };
            bonds.push(Bond { a, b, order });
        }
    }

    Ok(Molecule { atoms, bonds })
}

pub fn to_cjson(mol: &Molecule) -> Value {
    let numbers: Vec<u64> = mol.atoms.iter().map(|a| u64::from(a.atomic_number)).collect();
    let mut atoms = json!({ "elements": { "number": numbers } });
    if mol.has_coords() {
        let coords: Vec<f64> = mol
            .atoms
            .iter()
            .flat_map(|a| a.position.unwrap_or_default())
            .collect();
        atoms["coords"] = json!({ "3d": coords });
    }
    let mut doc = json!({ "chemicalJson": 1, "atoms": atoms });
    if !mol.bonds.is_empty() {
        let mut index = Vec::with_capacity(mol.bonds.len() * 2);
        let mut order = Vec::with_capacity(mol.bonds.len());
        for bond in &mol.bonds {
            index.push(bond.a as u64);
            index.push(bond.b as u64);
            order.push(u64::from(bond.order.integer()));
        }
        doc["bonds"] = json!({ "connections": { "index": index }, "order": order });
    }
    doc
}

// ---------------------------------------------------------------------------
// SMILES (subconjunto)

/// Tope del conteo de hidrógenos en un átomo de corchete. Ningún elemento
/// soportado enlaza más.
const MAX_BRACKET_H: u32 = 9;

struct SmilesParser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    mol: Molecule,
    aromatic: Vec<bool>,
    /// Hidrógenos fijados por corchete (None = calcular por valencia).
    explicit_h: Vec<Option<u8>>,
    prev: Option<usize>,
    pending: Option<BondOrder>,
    branches: Vec<Option<usize>>,
    rings: HashMap<u32, (usize, Option<BondOrder>)>,
}

impl<'a> SmilesParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            mol: Molecule::default(),
            aromatic: Vec::new(),
            explicit_h: Vec::new(),
            prev: None,
            pending: None,
            branches: Vec::new(),
            rings: HashMap::new(),
        }
    }

    fn err(message: impl Into<String>) -> ConvertError {
        ConvertError::Parse { format: "smiles".into(), message: message.into() }
    }

    fn push_atom(&mut self, z: u8, aromatic: bool, h: Option<u8>) {
        let idx = self.mol.atoms.len();
        self.mol.atoms.push(Atom { atomic_number: z, position: None });
        self.aromatic.push(aromatic);
        self.explicit_h.push(h);
        if let Some(prev) = self.prev {
            let order = self.pending.take().unwrap_or({
                if self.aromatic[prev] && aromatic {
                    BondOrder::Aromatic
                } else {
                    BondOrder::Single
                }
            });
            self.mol.bonds.push(Bond { a: prev, b: idx, order });
        }
        self.pending = None;
        self.prev = Some(idx);
    }

    fn close_ring(&mut self, label: u32) -> Result<(), ConvertError> {
        let current = self.prev.ok_or_else(|| Self::err("ring digit before any atom"))?;
        match self.rings.remove(&label) {
            None => {
                self.rings.insert(label, (current, self.pending.take()));
            }
            Some((other, opened_with)) => {
                let order = self
                    .pending
                    .take()
                    .or(opened_with)
                    .unwrap_or({
                        if self.aromatic[other] && self.aromatic[current] {
                            BondOrder::Aromatic
                        } else {
                            BondOrder::Single
                        }
                    });
                self.mol.bonds.push(Bond { a: other, b: current, order });
            }
        }
        Ok(())
    }

    fn read_bracket(&mut self) -> Result<(), ConvertError> {
        // Isótopo (ignorado).
        while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
            self.chars.next();
        }
        let first = self.chars.next().ok_or_else(|| Self::err("unterminated bracket atom"))?;
        let (symbol, aromatic) = if first.is_ascii_lowercase() {
            (first.to_ascii_uppercase().to_string(), true)
        } else {
            let mut sym = first.to_string();
            if let Some(&next) = self.chars.peek() {
                if next.is_ascii_lowercase() && next != 'h' {
                    let two = format!("{sym}{next}");
                    if elements::atomic_number(&two).is_some() {
                        sym = two;
                        self.chars.next();
                    }
                }
            }
            (sym, false)
        };
        let z = elements::atomic_number(&symbol)
            .ok_or_else(|| ConvertError::UnknownElement(symbol.clone()))?;

        let mut h_count: u8 = 0;
        loop {
            match self.chars.peek().copied() {
                Some('@') => {
                    self.chars.next();
                }
                Some('H') => {
                    self.chars.next();
                    h_count = 1;
                    if matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
                        let mut n = 0u32;
                        while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
                            n = n * 10 + self.chars.next().unwrap().to_digit(10).unwrap();
                            if n > MAX_BRACKET_H {
                                return Err(Self::err("hydrogen count out of range"));
                            }
                        }
                        h_count = n as u8;
                    }
                }
                Some('+') | Some('-') => {
                    // Carga: no afecta a fórmula ni masa aquí.
                    self.chars.next();
                    while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
                        self.chars.next();
                    }
                }
                Some(':') => {
                    self.chars.next();
                    while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
                        self.chars.next();
                    }
                }
                Some(']') => {
                    self.chars.next();
                    break;
                }
                _ => return Err(Self::err("unexpected token in bracket atom")),
            }
        }
        self.push_atom(z, aromatic, Some(h_count));
        Ok(())
    }

    fn parse(mut self) -> Result<Molecule, ConvertError> {
        while let Some(c) = self.chars.next() {
            match c {
                'C' => {
                    if self.chars.peek() == Some(&'l') {
                        self.chars.next();
                        self.push_atom(17, false, None);
                    } else {
                        self.push_atom(6, false, None);
                    }
                }
                'B' => {
                    if self.chars.peek() == Some(&'r') {
                        self.chars.next();
                        self.push_atom(35, false, None);
                    } else {
                        self.push_atom(5, false, None);
                    }
                }
                'N' => self.push_atom(7, false, None),
                'O' => self.push_atom(8, false, None),
                'P' => self.push_atom(15, false, None),
                'S' => self.push_atom(16, false, None),
                'F' => self.push_atom(9, false, None),
                'I' => self.push_atom(53, false, None),
                'b' => self.push_atom(5, true, None),
                'c' => self.push_atom(6, true, None),
                'n' => self.push_atom(7, true, None),
                'o' => self.push_atom(8, true, None),
                'p' => self.push_atom(15, true, None),
                's' => self.push_atom(16, true, None),
                '[' => self.read_bracket()?,
                '-' => self.pending = Some(BondOrder::Single),
                '=' => self.pending = Some(BondOrder::Double),
                '#' => self.pending = Some(BondOrder::Triple),
                ':' => self.pending = Some(BondOrder::Aromatic),
                '/' | '\\' => self.pending = Some(BondOrder::Single),
                '(' => self.branches.push(self.prev),
                ')' => {
                    self.prev =
                        self.branches.pop().ok_or_else(|| Self::err("unbalanced parenthesis"))?;
                }
                '.' => {
                    self.prev = None;
                    self.pending = None;
                }
                '%' => {
                    let d1 = self.chars.next().and_then(|c| c.to_digit(10));
                    let d2 = self.chars.next().and_then(|c| c.to_digit(10));
                    match (d1, d2) {
                        (Some(a), Some(b)) => self.close_ring(a * 10 + b)?,
                        _ => return Err(Self::err("bad %nn ring label")),
                    }
                }
                d if d.is_ascii_digit() => self.close_ring(d.to_digit(10).unwrap())?,
                other => return Err(Self::err(format!("unexpected character '{other}'"))),
            }
        }
        if !self.branches.is_empty() {
            return Err(Self::err("unbalanced parenthesis"));
        }
        if !self.rings.is_empty() {
            return Err(Self::err("unclosed ring bond"));
        }
        if self.mol.atoms.is_empty() {
            return Err(Self::err("no atoms"));
        }
        self.saturate();
        Ok(self.mol)
    }

    /// Materializa los hidrógenos implícitos (subconjunto orgánico) y los
    /// fijados por corchete.
    fn saturate(&mut self) {
        let heavy = self.mol.atoms.len();
        for i in 0..heavy {
            let count = match self.explicit_h[i] {
                Some(n) => usize::from(n),
                None => {
                    let z = self.mol.atoms[i].atomic_number;
                    match elements::typical_valence(z) {
                        Some(v) => {
                            let used = self.mol.bond_order_sum(i);
                            (f64::from(v) - used).floor().max(0.0) as usize
                        }
                        None => 0,
                    }
                }
            };
            for _ in 0..count {
                let h = self.mol.atoms.len();
                self.mol.atoms.push(Atom { atomic_number: 1, position: None });
                self.mol.bonds.push(Bond { a: i, b: h, order: BondOrder::Single });
            }
        }
    }
}

pub fn parse_smiles(data: &str) -> Result<Molecule, ConvertError> {
    SmilesParser::new(data.trim()).parse()
}

// ---------------------------------------------------------------------------
// InChI (capa de fórmula)

/// Extrae la molécula de la capa de fórmula de un InChI estándar. Sólo se
/// recuperan los átomos: la conectividad de las capas /c y /h queda fuera
/// de alcance.
pub fn parse_inchi(data: &str) -> Result<Molecule, ConvertError> {
    let err = |message: &str| ConvertError::Parse { format: "inchi".into(), message: message.into() };
    let trimmed = data.trim();
    let body = trimmed.strip_prefix("InChI=").ok_or_else(|| err("missing InChI= prefix"))?;
    let rest = body.strip_prefix("1S/").or_else(|| body.strip_prefix("1/"));
    let rest = rest.ok_or_else(|| err("unsupported InChI version"))?;
    let formula = rest.split('/').next().unwrap_or_default();
    if formula.is_empty() {
        return Err(err("empty formula layer"));
    }
    parse_formula(formula)
}

/// Parser de fórmulas Hill, con componentes separados por '.' y
/// multiplicadores delante ("2H2O").
pub fn parse_formula(formula: &str) -> Result<Molecule, ConvertError> {
    let err = |message: String| ConvertError::Parse { format: "formula".into(), message };
    let mut mol = Molecule::default();
    for component in formula.split('.') {
        let mut chars = component.chars().peekable();
        let mut multiplier: usize = 0;
        while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
            multiplier = multiplier * 10 + chars.next().unwrap().to_digit(10).unwrap() as usize;
        }
        let multiplier = multiplier.max(1);

        let mut component_atoms: Vec<(u8, usize)> = Vec::new();
        while let Some(c) = chars.next() {
            if !c.is_ascii_uppercase() {
                return Err(err(format!("unexpected character '{c}' in formula")));
            }
            let mut sym = c.to_string();
            if matches!(chars.peek(), Some(lc) if lc.is_ascii_lowercase()) {
                sym.push(chars.next().unwrap());
            }
            let z = elements::atomic_number(&sym)
                .ok_or_else(|| ConvertError::UnknownElement(sym.clone()))?;
            let mut count: usize = 0;
            while matches!(chars.peek(), Some(d) if d.is_ascii_digit()) {
                count = count * 10 + chars.next().unwrap().to_digit(10).unwrap() as usize;
            }
            component_atoms.push((z, count.max(1)));
        }
        if component_atoms.is_empty() {
            return Err(err("empty formula component".into()));
        }
        for _ in 0..multiplier {
            for (z, count) in &component_atoms {
                for _ in 0..*count {
                    mol.atoms.push(Atom { atomic_number: *z, position: None });
                }
            }
        }
    }
    Ok(mol)
}
