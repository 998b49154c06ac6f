/// A single atom entry of a molecule type.
///
/// Only the properties needed by mass-weighted reductions are kept here; charges,
/// force field types and the like belong to the force computation, not to output.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom name (e.g., "OW", "CA").
    pub name: String,
    /// The atomic mass in atomic mass units (g/mol).
    pub mass: f64,
}

impl Atom {
    /// Creates a new `Atom` with the given name and mass.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `mass` - The atomic mass in g/mol.
    pub fn new(name: &str, mass: f64) -> Self {
        Self {
            name: name.to_string(),
            mass,
        }
    }

    /// Returns `true` if the atom carries no mass (virtual sites, dummies).
    #[inline]
    pub fn is_massless(&self) -> bool {
        self.mass == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_stores_name_and_mass() {
        let atom = Atom::new("OW", 15.9994);
        assert_eq!(atom.name, "OW");
        assert_eq!(atom.mass, 15.9994);
        assert!(!atom.is_massless());
    }

    #[test]
    fn virtual_site_is_massless() {
        let atom = Atom::new("MW", 0.0);
        assert!(atom.is_massless());
    }

    #[test]
    fn atom_equality_and_clone_works() {
        let atom1 = Atom::new("HW1", 1.008);
        let atom2 = atom1.clone();
        assert_eq!(atom1, atom2);
    }
}
