//! Color operators.
//!
//! Handles: G, g, RG, rg, K, k, CS, cs, SC, SCN, sc, scn
//!
//! - G/g: DeviceGray (stroke/non-stroke)
//! - RG/rg: DeviceRGB (stroke/non-stroke)
//! - K/k: DeviceCMYK (stroke/non-stroke)
//! - CS/cs: Select a color space by family or resource name
//! - SC/SCN/sc/scn: Set color in the current color space

use lopdf::Object;

use crate::document::as_number;
use crate::interp::device::Device;
use crate::interp::interpreter::PageInterpreter;
use crate::interp::state::{Color, ColorSpace};

#[allow(non_snake_case)]
impl<'a, D: Device> PageInterpreter<'a, D> {
    /// PDF operator: `G`
    pub fn do_G(&mut self, gray: f64) {
        self.graphicstate.scs = ColorSpace::Gray;
        self.graphicstate.scolor = Color::Gray(gray);
    }

    /// PDF operator: `g`
    pub fn do_g(&mut self, gray: f64) {
        self.graphicstate.ncs = ColorSpace::Gray;
        self.graphicstate.ncolor = Color::Gray(gray);
    }

    /// PDF operator: `RG`
    pub fn do_RG(&mut self, r: f64, g: f64, b: f64) {
        self.graphicstate.scs = ColorSpace::Rgb;
        self.graphicstate.scolor = Color::Rgb(r, g, b);
    }

    /// PDF operator: `rg`
    pub fn do_rg(&mut self, r: f64, g: f64, b: f64) {
        self.graphicstate.ncs = ColorSpace::Rgb;
        self.graphicstate.ncolor = Color::Rgb(r, g, b);
    }

    /// PDF operator: `K`
    pub fn do_K(&mut self, c: f64, m: f64, y: f64, k: f64) {
        self.graphicstate.scs = ColorSpace::Cmyk;
        self.graphicstate.scolor = Color::Cmyk(c, m, y, k);
    }

    /// PDF operator: `k`
    pub fn do_k(&mut self, c: f64, m: f64, y: f64, k: f64) {
        self.graphicstate.ncs = ColorSpace::Cmyk;
        self.graphicstate.ncolor = Color::Cmyk(c, m, y, k);
    }

    /// Selects the stroking color space.
    ///
    /// PDF operator: `CS`
    pub fn do_CS(&mut self, name: &str) {
        let space = self.lookup_colorspace(name);
        self.graphicstate.scs = space;
        self.graphicstate.scolor = space.initial_color();
    }

    /// Selects the non-stroking color space.
    ///
    /// PDF operator: `cs`
    pub fn do_cs(&mut self, name: &str) {
        let space = self.lookup_colorspace(name);
        self.graphicstate.ncs = space;
        self.graphicstate.ncolor = space.initial_color();
    }

    /// Sets the stroking color in the current stroking color space.
    ///
    /// PDF operator: `SC` / `SCN`
    pub fn do_SC(&mut self, args: &[Object]) {
        let values: Vec<f64> = args.iter().filter_map(as_number).collect();
        self.graphicstate.scolor = Color::from_operands(self.graphicstate.scs, &values);
    }

    /// Sets the non-stroking color in the current non-stroking color space.
    ///
    /// A trailing pattern name (uncolored patterns) leaves the color unknown.
    ///
    /// PDF operator: `sc` / `scn`
    pub fn do_sc(&mut self, args: &[Object]) {
        let values: Vec<f64> = args.iter().filter_map(as_number).collect();
        self.graphicstate.ncolor = Color::from_operands(self.graphicstate.ncs, &values);
    }

    /// Resolves a color space operand: a family name, or a key in the
    /// resources' /ColorSpace dictionary.
    fn lookup_colorspace(&self, name: &str) -> ColorSpace {
        if let Some(space) = ColorSpace::from_family(name.as_bytes()) {
            return space;
        }
        let doc = self.doc;
        let Some(spec) = self
            .resources
            .and_then(|r| doc.get_dict(r, b"ColorSpace"))
            .and_then(|spaces| doc.get(spaces, name.as_bytes()))
        else {
            return ColorSpace::Other;
        };

        match spec {
            Object::Name(family) => ColorSpace::from_family(family).unwrap_or(ColorSpace::Other),
            Object::Array(parts) => {
                let family = parts.first().and_then(|o| doc.resolve(o));
                match family {
                    Some(Object::Name(f)) if f.as_slice() == b"ICCBased" => parts
                        .get(1)
                        .and_then(|s| doc.resolve(s))
                        .and_then(|s| s.as_stream().ok())
                        .and_then(|s| doc.get(&s.dict, b"N"))
                        .and_then(as_number)
                        .map_or(ColorSpace::Other, |n| ColorSpace::from_components(n as usize)),
                    Some(Object::Name(f)) => {
                        ColorSpace::from_family(f).unwrap_or(ColorSpace::Other)
                    }
                    _ => ColorSpace::Other,
                }
            }
            _ => ColorSpace::Other,
        }
    }
}
