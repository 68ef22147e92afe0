//! Named ellipsoids, datums, prime meridians and linear units.
//!
//! Lookups are case-insensitive. Angles in the prime meridian table are in
//! degrees east of Greenwich.

/// Second defining parameter of a named ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    InverseFlattening(f64),
    MinorAxis(f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EllipsoidDef {
    pub name: &'static str,
    pub a: f64,
    pub shape: Shape,
    pub description: &'static str,
}

impl EllipsoidDef {
    /// Semi-minor axis.
    pub fn b(&self) -> f64 {
        match self.shape {
            Shape::MinorAxis(b) => b,
            Shape::InverseFlattening(rf) if rf == 0.0 => self.a,
            Shape::InverseFlattening(rf) => (1.0 - 1.0 / rf) * self.a,
        }
    }
}

const fn rf(name: &'static str, a: f64, rf: f64, description: &'static str) -> EllipsoidDef {
    EllipsoidDef {
        name,
        a,
        shape: Shape::InverseFlattening(rf),
        description,
    }
}

const fn axes(name: &'static str, a: f64, b: f64, description: &'static str) -> EllipsoidDef {
    EllipsoidDef {
        name,
        a,
        shape: Shape::MinorAxis(b),
        description,
    }
}

pub static ELLIPSOIDS: &[EllipsoidDef] = &[
    rf("MERIT", 6_378_137.0, 298.257, "MERIT 1983"),
    rf("SGS85", 6_378_136.0, 298.257, "Soviet Geodetic System 85"),
    rf("GRS80", 6_378_137.0, 298.257_222_101, "GRS 1980(IUGG, 1980)"),
    rf("IAU76", 6_378_140.0, 298.257, "IAU 1976"),
    axes("airy", 6_377_563.396, 6_356_256.910, "Airy 1830"),
    rf("APL4", 6_378_137.0, 298.25, "Appl. Physics. 1965"),
    rf("NWL9D", 6_378_145.0, 298.25, "Naval Weapons Lab., 1965"),
    axes("mod_airy", 6_377_340.189, 6_356_034.446, "Modified Airy"),
    rf("andrae", 6_377_104.43, 300.0, "Andrae 1876 (Den., Iclnd.)"),
    rf("aust_SA", 6_378_160.0, 298.25, "Australian Natl & S. Amer. 1969"),
    rf("GRS67", 6_378_160.0, 298.247_167_427, "GRS 67(IUGG 1967)"),
    rf("bessel", 6_377_397.155, 299.152_812_8, "Bessel 1841"),
    rf("bess_nam", 6_377_483.865, 299.152_812_8, "Bessel 1841 (Namibia)"),
    axes("clrk66", 6_378_206.4, 6_356_583.8, "Clarke 1866"),
    rf("clrk80", 6_378_249.145, 293.4663, "Clarke 1880 mod."),
    rf("clrk80ign", 6_378_249.2, 293.466_021_3, "Clarke 1880 (IGN)"),
    rf("clrk58", 6_378_293.645_208_759, 294.260_676_369_265_4, "Clarke 1858"),
    rf("CPM", 6_375_738.7, 334.29, "Comm. des Poids et Mesures 1799"),
    rf("delmbr", 6_376_428.0, 311.5, "Delambre 1810 (Belgium)"),
    rf("engelis", 6_378_136.05, 298.2566, "Engelis 1985"),
    rf("evrst30", 6_377_276.345, 300.8017, "Everest 1830"),
    rf("evrst48", 6_377_304.063, 300.8017, "Everest 1948"),
    rf("evrst56", 6_377_301.243, 300.8017, "Everest 1956"),
    rf("evrst69", 6_377_295.664, 300.8017, "Everest 1969"),
    rf("evrstSS", 6_377_298.556, 300.8017, "Everest (Sabah & Sarawak)"),
    rf("fschr60", 6_378_166.0, 298.3, "Fischer (Mercury Datum) 1960"),
    rf("fschr60m", 6_378_155.0, 298.3, "Fischer 1960"),
    rf("fschr68", 6_378_150.0, 298.3, "Fischer 1968"),
    rf("helmert", 6_378_200.0, 298.3, "Helmert 1906"),
    rf("hough", 6_378_270.0, 297.0, "Hough"),
    rf("intl", 6_378_388.0, 297.0, "International 1909 (Hayford)"),
    rf("kaula", 6_378_163.0, 298.24, "Kaula 1961"),
    rf("lerch", 6_378_139.0, 298.257, "Lerch 1979"),
    rf("mprts", 6_397_300.0, 191.0, "Maupertius 1738"),
    axes("new_intl", 6_378_157.5, 6_356_772.2, "New International 1967"),
    axes("plessis", 6_376_523.0, 6_355_863.0, "Plessis 1817 (France)"),
    rf("krass", 6_378_245.0, 298.3, "Krassovsky, 1942"),
    axes("SEasia", 6_378_155.0, 6_356_773.320_5, "Southeast Asia"),
    axes("walbeck", 6_376_896.0, 6_355_834.846_7, "Walbeck"),
    rf("WGS60", 6_378_165.0, 298.3, "WGS 60"),
    rf("WGS66", 6_378_145.0, 298.25, "WGS 66"),
    rf("WGS7", 6_378_135.0, 298.26, "WGS 72"),
    rf("WGS84", 6_378_137.0, 298.257_223_563, "WGS 84"),
    axes("sphere", 6_370_997.0, 6_370_997.0, "Normal Sphere (r=6370997)"),
];

pub fn ellipsoid(name: &str) -> Option<&'static EllipsoidDef> {
    ELLIPSOIDS.iter().find(|e| e.name.eq_ignore_ascii_case(name))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DatumDef {
    pub code: &'static str,
    pub ellps: &'static str,
    pub towgs84: Option<&'static [f64]>,
    pub nadgrids: Option<&'static str>,
    pub name: &'static str,
}

const fn helmert(
    code: &'static str,
    ellps: &'static str,
    towgs84: &'static [f64],
    name: &'static str,
) -> DatumDef {
    DatumDef {
        code,
        ellps,
        towgs84: Some(towgs84),
        nadgrids: None,
        name,
    }
}

pub static DATUMS: &[DatumDef] = &[
    helmert("wgs84", "WGS84", &[0.0, 0.0, 0.0], "WGS84"),
    helmert("ch1903", "bessel", &[674.374, 15.056, 405.346], "swiss"),
    helmert("ggrs87", "GRS80", &[-199.87, 74.79, 246.62], "Greek_Geodetic_Reference_System_1987"),
    helmert("nad83", "GRS80", &[0.0, 0.0, 0.0], "North_American_Datum_1983"),
    DatumDef {
        code: "nad27",
        ellps: "clrk66",
        towgs84: None,
        nadgrids: Some("@conus,@alaska,@ntv2_0.gsb,@ntv1_can.dat"),
        name: "North_American_Datum_1927",
    },
    helmert("potsdam", "bessel", &[598.1, 73.7, 418.2, 0.202, 0.045, -2.455, 6.7], "Potsdam Rauenberg 1950 DHDN"),
    helmert("carthage", "clrk80ign", &[-263.0, 6.0, 431.0], "Carthage 1934 Tunisia"),
    helmert("hermannskogel", "bessel", &[577.326, 90.129, 463.919, 5.137, 1.474, 5.297, 2.4232], "Hermannskogel"),
    helmert("osni52", "airy", &[482.530, -130.596, 564.557, -1.042, -0.214, -0.631, 8.15], "Irish National"),
    helmert("ire65", "mod_airy", &[482.530, -130.596, 564.557, -1.042, -0.214, -0.631, 8.15], "Ireland 1965"),
    helmert("rassadiran", "intl", &[-133.63, -157.5, -158.62], "Rassadiran"),
    helmert("nzgd49", "intl", &[59.47, -5.04, 187.44, 0.47, -0.1, 1.024, -4.5993], "New Zealand Geodetic Datum 1949"),
    helmert("osgb36", "airy", &[446.448, -125.157, 542.060, 0.1502, 0.2470, 0.8421, -20.4894], "Airy 1830"),
    helmert("s_jtsk", "bessel", &[589.0, 76.0, 346.0], "S-JTSK (Ferro)"),
    helmert("beduaram", "clrk80", &[-106.0, -87.0, 188.0], "Beduaram"),
    helmert("gunung_segara", "bessel", &[-403.0, 684.0, 41.0], "Gunung Segara Jakarta"),
    helmert("rnb72", "intl", &[106.869, -52.2978, 103.724, -0.33657, 0.456955, -1.84218, 1.0], "Reseau National Belge 1972"),
];

pub fn datum(code: &str) -> Option<&'static DatumDef> {
    DATUMS.iter().find(|d| d.code.eq_ignore_ascii_case(code))
}

pub static PRIME_MERIDIANS: &[(&str, f64)] = &[
    ("greenwich", 0.0),
    ("lisbon", -9.131_906_111_111),
    ("paris", 2.337_229_166_667),
    ("bogota", -74.080_916_666_667),
    ("madrid", -3.687_938_888_889),
    ("rome", 12.452_333_333_333),
    ("bern", 7.439_583_333_333),
    ("jakarta", 106.807_719_444_444),
    ("ferro", -17.666_666_666_667),
    ("brussels", 4.367_975),
    ("stockholm", 18.058_277_777_778),
    ("athens", 23.716_337_5),
    ("oslo", 10.722_916_666_667),
];

/// Offset of a named prime meridian, in degrees.
pub fn prime_meridian(name: &str) -> Option<f64> {
    PRIME_MERIDIANS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, deg)| deg)
}

pub static UNITS: &[(&str, f64)] = &[
    ("m", 1.0),
    ("km", 1000.0),
    ("ft", 0.3048),
    ("us-ft", 1200.0 / 3937.0),
];

pub fn unit_to_meter(name: &str) -> Option<f64> {
    UNITS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, f)| f)
}
