//! Periodic table data: standard atomic weights, Pauling electronegativities
//! (0.0 where undefined) and the default oxide used for oxide-percent calculations.

/// One entry of the periodic table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub atomic_weight: f64,
    pub electronegativity: f64,
    pub default_oxide: &'static str,
}

const fn el(
    symbol: &'static str,
    atomic_weight: f64,
    electronegativity: f64,
    default_oxide: &'static str,
) -> Element {
    Element {
        symbol,
        atomic_weight,
        electronegativity,
        default_oxide,
    }
}

pub const ELEMENTS: &[Element] = &[
    el("H", 1.008, 2.20, "H2O"),
    el("He", 4.002602, 0.0, "He"),
    el("Li", 6.94, 0.98, "Li2O"),
    el("Be", 9.0121831, 1.57, "BeO"),
    el("B", 10.81, 2.04, "B2O3"),
    el("C", 12.011, 2.55, "CO2"),
    el("N", 14.007, 3.04, "NO2"),
    el("O", 15.999, 3.44, "O"),
    el("F", 18.998403162, 3.98, "F2O"),
    el("Ne", 20.1797, 0.0, "Ne"),
    el("Na", 22.98976928, 0.93, "Na2O"),
    el("Mg", 24.305, 1.31, "MgO"),
    el("Al", 26.9815384, 1.61, "Al2O3"),
    el("Si", 28.085, 1.90, "SiO2"),
    el("P", 30.973761998, 2.19, "P2O3"),
    el("S", 32.06, 2.58, "SO3"),
    el("Cl", 35.45, 3.16, "ClO2"),
    el("Ar", 39.95, 0.0, "Ar"),
    el("K", 39.098, 0.82, "K2O"),
    el("Ca", 40.078, 1.00, "CaO"),
    el("Sc", 44.955907, 1.36, "Sc2O3"),
    el("Ti", 47.867, 1.54, "TiO2"),
    el("V", 50.9415, 1.63, "V2O5"),
    el("Cr", 51.9961, 1.66, "Cr2O3"),
    el("Mn", 54.938043, 1.55, "MnO2"),
    el("Fe", 55.845, 1.83, "Fe2O3"),
    el("Co", 58.933194, 1.88, "Co2O3"),
    el("Ni", 58.6934, 1.91, "NiO"),
    el("Cu", 63.546, 1.90, "Cu2O"),
    el("Zn", 65.38, 1.65, "ZnO"),
    el("Ga", 69.723, 1.81, "Ga2O3"),
    el("Ge", 72.63, 2.01, "GeO2"),
    el("As", 74.921595, 2.18, "As2O3"),
    el("Se", 78.971, 2.55, "Se3O4"),
    el("Br", 79.904, 2.96, "BrO2"),
    el("Kr", 83.798, 3.00, "Kr"),
    el("Rb", 85.4678, 0.82, "Rb2O"),
    el("Sr", 87.62, 0.95, "SrO"),
    el("Y", 88.905838, 1.22, "Y2O3"),
    el("Zr", 91.222, 1.33, "ZrO2"),
    el("Nb", 92.90637, 1.6, "Nb2O5"),
    el("Mo", 95.95, 2.16, "MoO3"),
    el("Tc", 97.0, 1.9, "TcO2"),
    el("Ru", 101.07, 2.2, "RuO2"),
    el("Rh", 102.90549, 2.28, "Rh2O3"),
    el("Pd", 106.42, 2.20, "PdO"),
    el("Ag", 107.8682, 1.93, "Ag2O"),
    el("Cd", 112.414, 1.69, "CdO"),
    el("In", 114.818, 1.78, "In2O3"),
    el("Sn", 118.71, 1.96, "SnO2"),
    el("Sb", 121.76, 2.05, "Sb2O3"),
    el("Te", 127.6, 2.1, "TeO3"),
    el("I", 126.90447, 2.66, "I2O5"),
    el("Xe", 131.29, 2.6, "Xe"),
    el("Cs", 132.90545196, 0.79, "Cs2O"),
    el("Ba", 137.327, 0.89, "BaO"),
    el("La", 138.90547, 1.10, "La2O3"),
    el("Ce", 140.116, 1.12, "CeO2"),
    el("Pr", 140.90766, 1.13, "Pr2O3"),
    el("Nd", 144.242, 1.14, "Nd2O3"),
    el("Pm", 145.0, 1.13, "Pm2O3"),
    el("Sm", 150.36, 1.17, "Sm2O3"),
    el("Eu", 151.964, 1.2, "Eu2O3"),
    el("Gd", 157.249, 1.2, "Gd2O3"),
    el("Tb", 158.925354, 1.1, "Tb2O3"),
    el("Dy", 162.5, 1.22, "Dy2O3"),
    el("Ho", 164.930329, 1.23, "Ho2O3"),
    el("Er", 167.259, 1.24, "Er2O3"),
    el("Tm", 168.934219, 1.25, "Tm2O3"),
    el("Yb", 173.045, 1.1, "Yb2O3"),
    el("Lu", 174.96669, 1.27, "Lu2O3"),
    el("Hf", 178.486, 1.3, "HfO2"),
    el("Ta", 180.94788, 1.5, "Ta2O5"),
    el("W", 183.84, 2.36, "WO3"),
    el("Re", 186.207, 1.9, "Re2O7"),
    el("Os", 190.23, 2.2, "OsO3"),
    el("Ir", 192.217, 2.20, "Ir2O3"),
    el("Pt", 195.084, 2.28, "PtO"),
    el("Au", 196.966570, 2.54, "Au2O3"),
    el("Hg", 200.592, 2.00, "HgO2"),
    el("Tl", 204.38, 1.62, "Tl2O"),
    el("Pb", 207.2, 2.33, "PbO2"),
    el("Bi", 208.98040, 2.02, "Bi2O3"),
    el("Po", 209.0, 2.0, "PoO2"),
    el("At", 210.0, 2.2, "At2O"),
    el("Rn", 222.0, 2.2, "Rn"),
    el("Fr", 223.0, 0.7, "Fr2O"),
    el("Ra", 226.0, 0.9, "RaO"),
    el("Ac", 227.0, 1.1, "Ac2O3"),
    el("Th", 232.0377, 1.3, "ThO2"),
    el("Pa", 231.03588, 1.5, "Pa2O5"),
    el("U", 238.02891, 1.38, "UO2"),
    el("Np", 237.0, 1.36, "NpO2"),
    el("Pu", 244.0, 1.28, "PuO2"),
    el("Am", 243.0, 1.13, "AmO2"),
    el("Cm", 247.0, 1.28, "Cm2O3"),
    el("Bk", 247.0, 1.3, "BkO2"),
    el("Cf", 251.0, 1.3, "Cf2O3"),
    el("Es", 252.0, 1.3, "Es2O3"),
    el("Fm", 257.0, 1.3, "Fm2O3"),
    el("Md", 258.0, 1.3, "Md2O3"),
    el("No", 259.0, 1.3, "No2O3"),
    el("Lr", 262.0, 1.3, "Lr2O3"),
    el("Rf", 267.0, 0.0, "RfO2"),
    el("Db", 270.0, 0.0, "Db2O5"),
    el("Sg", 269.0, 0.0, "SgO4"),
    el("Bh", 270.0, 0.0, "Bh2O7"),
    el("Hs", 270.0, 0.0, "HsO3"),
    el("Mt", 278.0, 0.0, "Mt2O3"),
    el("Ds", 281.0, 0.0, "DsO2"),
    el("Rg", 281.0, 0.0, "RgO"),
    el("Cn", 285.0, 0.0, "Cn2O3"),
    el("Nh", 286.0, 0.0, "NhO2"),
    el("Fl", 289.0, 0.0, "FlO2"),
    el("Mc", 289.0, 0.0, "Mc2O5"),
    el("Lv", 293.0, 0.0, "LvO3"),
    el("Ts", 293.0, 0.0, "Ts2O7"),
    el("Og", 294.0, 0.0, "Og"),
];

/// Read-only lookup of element data. The balancer and the mass calculators only
/// talk to the table through this trait, so a custom table (isotope-enriched weights,
/// different oxide conventions) can be plugged in.
pub trait ElementData {
    fn element(&self, symbol: &str) -> Option<&Element>;

    fn contains(&self, symbol: &str) -> bool {
        self.element(symbol).is_some()
    }
    fn weight(&self, symbol: &str) -> Option<f64> {
        self.element(symbol).map(|e| e.atomic_weight)
    }
    fn electronegativity(&self, symbol: &str) -> Option<f64> {
        self.element(symbol).map(|e| e.electronegativity)
    }
    fn default_oxide(&self, symbol: &str) -> Option<&str> {
        self.element(symbol).map(|e| e.default_oxide)
    }
}

/// The built-in table of all 118 elements
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodicTable;

impl ElementData for PeriodicTable {
    fn element(&self, symbol: &str) -> Option<&Element> {
        ELEMENTS.iter().find(|e| e.symbol == symbol)
    }
}
