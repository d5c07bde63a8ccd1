use std::{fmt, path::Path};

use indexmap::IndexMap;

mod encoding;
mod error;
pub mod ioc;
pub mod mcu_xml;
mod parse;
pub mod pcf;
mod raw;
pub mod table;
pub mod tango;
pub mod verilog;

pub use encoding::Encoding;
pub use error::{Diagnostic, DiagnosticKind, Error, Result, Severity};

/// Net labels treated as power rails. Matched literally.
pub const POWER_NET_LABELS: [&str; 7] = ["GND", "1V2", "1.2V", "3V3", "3.3V", "5V", "12V"];

pub const WILDCARD_DESIGNATOR: &str = "*";

/// Read and parse a Tango netlist file
pub fn load_netlist(path: impl AsRef<Path>) -> Result<Netlist> {
    tango::load(path, Encoding::default())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(usize);

/// Identity of a pin: its owner and its position in the owner's pin list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId {
    pub component: ComponentId,
    index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId(usize);

/// One physical terminal of a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    name: String,
    owner: ComponentId,
}

impl Pin {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> ComponentId {
        self.owner
    }
}

/// A part on the board, identified by its designator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    id: ComponentId,
    designator: String,
    footprint: String,
    description: String,
    pins: Vec<Pin>,
}

impl Component {
    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn designator(&self) -> &str {
        &self.designator
    }

    pub fn footprint(&self) -> &str {
        &self.footprint
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn pin_ids(&self) -> impl Iterator<Item = PinId> + '_ {
        (0..self.pins.len()).map(|index| PinId {
            component: self.id,
            index,
        })
    }

    pub fn pin_by_name(&self, name: &str) -> Option<PinId> {
        self.pins
            .iter()
            .position(|pin| pin.name == name)
            .map(|index| PinId {
                component: self.id,
                index,
            })
    }

    /// Return the pin called `name`, appending it first if the component
    /// does not have it yet.
    pub fn get_or_create_pin(&mut self, name: &str) -> PinId {
        if let Some(pin) = self.pin_by_name(name) {
            return pin;
        }
        self.pins.push(Pin {
            name: name.to_owned(),
            owner: self.id,
        });
        PinId {
            component: self.id,
            index: self.pins.len() - 1,
        }
    }
}

/// A list of connected pins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Net {
    label: String,
    pins: Vec<PinId>,
}

impl Net {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            pins: vec![],
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pins(&self) -> &[PinId] {
        &self.pins
    }

    pub fn add_pin(&mut self, pin: PinId) {
        self.pins.push(pin);
    }

    // TODO: match power rails by pattern once downstream tools agree on one
    pub fn is_power(&self) -> bool {
        POWER_NET_LABELS.contains(&self.label.as_str())
    }
}

impl fmt::Display for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// How to pick a component out of a netlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentSelector<'a> {
    Designator(&'a str),
    Description(&'a str),
    /// Substring of either designator or description
    Keyword(&'a str),
}

impl fmt::Display for ComponentSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentSelector::Designator(s) => write!(f, "designator '{s}'"),
            ComponentSelector::Description(s) => write!(f, "description '{s}'"),
            ComponentSelector::Keyword(s) => write!(f, "keyword '{s}'"),
        }
    }
}

/// Two components meeting on a signal net
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub net: NetId,
    pub pin_a: PinId,
    pub pin_b: PinId,
}

fn designator_key(designator: &str) -> String {
    designator.trim().to_uppercase()
}

/// The components and nets of a board
#[derive(Debug, Clone, Default)]
pub struct Netlist {
    components: IndexMap<String, Component>,
    nets: Vec<Net>,
    diagnostics: Vec<Diagnostic>,
}

impl Netlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn net_ids(&self) -> impl Iterator<Item = NetId> {
        (0..self.nets.len()).map(NetId)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// # Panics
    ///
    /// Ids are only valid for the netlist that handed them out. Panics if
    /// `id` is out of range for this one.
    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id.0]
    }

    /// # Panics
    ///
    /// Like [`Netlist::component`].
    pub fn component_mut(&mut self, id: ComponentId) -> &mut Component {
        &mut self.components[id.0]
    }

    /// # Panics
    ///
    /// Panics if the pin or its component does not belong to this netlist.
    pub fn pin(&self, id: PinId) -> &Pin {
        &self.component(id.component).pins[id.index]
    }

    /// # Panics
    ///
    /// Panics if `id` is out of range for this netlist.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.0]
    }

    /// `designator,pin` form of a pin
    pub fn pin_display(&self, id: PinId) -> String {
        format!(
            "{},{}",
            self.component(id.component).designator,
            self.pin(id).name
        )
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }

    fn id_of(&self, designator: &str) -> Option<ComponentId> {
        self.components
            .get_index_of(&designator_key(designator))
            .map(ComponentId)
    }

    /// Add a component. Designators are unique ignoring case; when one is
    /// already present the existing component is kept and `Err` carries its id.
    pub fn add_component(
        &mut self,
        designator: &str,
        footprint: &str,
        description: &str,
    ) -> std::result::Result<ComponentId, ComponentId> {
        let designator = designator.trim();
        if let Some(existing) = self.id_of(designator) {
            return Err(existing);
        }
        if designator == WILDCARD_DESIGNATOR {
            self.record(Diagnostic::warning(DiagnosticKind::WildcardDesignator));
        }
        let id = ComponentId(self.components.len());
        self.components.insert(
            designator_key(designator),
            Component {
                id,
                designator: designator.to_owned(),
                footprint: footprint.trim().to_owned(),
                description: description.trim().to_owned(),
                pins: vec![],
            },
        );
        Ok(id)
    }

    pub fn add_net(&mut self, net: Net) -> NetId {
        self.nets.push(net);
        NetId(self.nets.len() - 1)
    }

    pub fn get_component(&self, selector: ComponentSelector) -> Result<&Component> {
        let found = match selector {
            ComponentSelector::Designator(designator) => self
                .id_of(designator)
                .map(|id| self.component(id)),
            ComponentSelector::Description(description) => {
                let description = description.trim().to_uppercase();
                self.components()
                    .find(|c| c.description.to_uppercase() == description)
            }
            ComponentSelector::Keyword(keyword) => {
                let keyword = keyword.trim().to_uppercase();
                self.components().find(|c| {
                    c.designator.to_uppercase().contains(&keyword)
                        || c.description.to_uppercase().contains(&keyword)
                })
            }
        };
        found.ok_or_else(|| {
            tracing::warn!("Component not found: {selector}");
            Error::ComponentNotFound(selector.to_string())
        })
    }

    pub fn component_by_designator(&self, designator: &str) -> Result<&Component> {
        self.get_component(ComponentSelector::Designator(designator))
    }

    pub fn component_by_description(&self, description: &str) -> Result<&Component> {
        self.get_component(ComponentSelector::Description(description))
    }

    pub fn component_by_keyword(&self, keyword: &str) -> Result<&Component> {
        self.get_component(ComponentSelector::Keyword(keyword))
    }

    pub fn get_net(&self, label: &str) -> Result<&Net> {
        self.nets
            .iter()
            .find(|net| net.label == label)
            .ok_or_else(|| {
                tracing::warn!("Net not found: {label}");
                Error::NetNotFound(label.to_owned())
            })
    }

    /// The first net the pin is connected to
    pub fn get_net_on_pin(&self, pin: PinId) -> Option<&Net> {
        self.nets.iter().find(|net| net.pins.contains(&pin))
    }

    /// First pin on `net` belonging to the component `designator`
    pub fn net_pin_of(&self, net: &Net, designator: &str) -> Option<PinId> {
        let id = self.id_of(designator)?;
        net.pins.iter().copied().find(|pin| pin.component == id)
    }

    /// Every signal net on which both components have a pin, in net order.
    ///
    /// Power nets and nets with fewer than two pins are ignored. When a
    /// component has several pins on one net only the first one is reported.
    pub fn elaborate_component_connections(
        &self,
        designator_a: &str,
        designator_b: &str,
    ) -> Vec<Connection> {
        let mut connections = vec![];
        for (id, net) in self.net_ids().zip(&self.nets) {
            if net.is_power() || net.pins.len() < 2 {
                continue;
            }
            let Some(pin_a) = self.net_pin_of(net, designator_a) else {
                continue;
            };
            let Some(pin_b) = self.net_pin_of(net, designator_b) else {
                continue;
            };
            tracing::debug!(
                "Component {} pin {} is connected to component {} pin {} on net {}",
                designator_a,
                self.pin(pin_a).name,
                designator_b,
                self.pin(pin_b).name,
                net.label
            );
            connections.push(Connection {
                net: id,
                pin_a,
                pin_b,
            });
        }
        connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn board() -> Netlist {
        let mut netlist = Netlist::new();
        let u1 = netlist.add_component("U1", "SOIC8", "MCU").unwrap();
        let u2 = netlist.add_component("U2", "0603", "Sensor").unwrap();

        let u1_1 = netlist.component_mut(u1).get_or_create_pin("1");
        let u1_2 = netlist.component_mut(u1).get_or_create_pin("2");
        let u2_a = netlist.component_mut(u2).get_or_create_pin("A");

        let mut sig = Net::new("SIG1");
        sig.add_pin(u1_1);
        sig.add_pin(u2_a);
        netlist.add_net(sig);

        let mut gnd = Net::new("GND");
        gnd.add_pin(u1_2);
        netlist.add_net(gnd);
        netlist
    }

    #[test]
    fn get_or_create_pin_is_idempotent() {
        let mut netlist = Netlist::new();
        let id = netlist.add_component("R1", "0603", "Resistor").unwrap();
        let component = netlist.component_mut(id);

        let first = component.get_or_create_pin("1");
        let second = component.get_or_create_pin("1");
        assert_eq!(first, second);
        assert_eq!(component.pins().len(), 1);

        let other = component.get_or_create_pin("2");
        assert_ne!(first, other);
        assert_eq!(component.pins().len(), 2);
        assert_eq!(netlist.pin(other).owner(), id);
    }

    #[rstest]
    #[case("U1")]
    #[case("u1")]
    #[case("  u1 ")]
    fn designator_lookup_ignores_case_and_blanks(#[case] designator: &str) {
        let netlist = board();
        let component = netlist.component_by_designator(designator).unwrap();
        assert_eq!(component.designator(), "U1");
    }

    #[rstest]
    #[case(ComponentSelector::Description("sensor"), "U2")]
    #[case(ComponentSelector::Keyword("mc"), "U1")]
    #[case(ComponentSelector::Keyword("u"), "U1")]
    #[case(ComponentSelector::Keyword("SENS"), "U2")]
    fn selector_lookup(#[case] selector: ComponentSelector, #[case] expected: &str) {
        let netlist = board();
        let component = netlist.get_component(selector).unwrap();
        assert_eq!(component.designator(), expected);
    }

    #[test]
    fn missing_component_is_an_error_value() {
        let netlist = board();
        let err = netlist.component_by_designator("U9").unwrap_err();
        assert!(matches!(err, Error::ComponentNotFound(_)));
        assert!(netlist.component_by_description("MC").is_err());
    }

    #[test]
    fn net_lookup_is_case_sensitive() {
        let netlist = board();
        assert_eq!(netlist.get_net("SIG1").unwrap().label(), "SIG1");
        assert!(matches!(
            netlist.get_net("sig1"),
            Err(Error::NetNotFound(_))
        ));
    }

    #[test]
    fn net_on_pin() {
        let netlist = board();
        let u2 = netlist.component_by_designator("U2").unwrap();
        let pin = u2.pin_by_name("A").unwrap();
        assert_eq!(netlist.get_net_on_pin(pin).unwrap().label(), "SIG1");

        let mut netlist = netlist;
        let u2 = netlist.component_by_designator("U2").unwrap().id();
        let lonely = netlist.component_mut(u2).get_or_create_pin("B");
        assert!(netlist.get_net_on_pin(lonely).is_none());
    }

    #[rstest]
    #[case("GND", true)]
    #[case("3V3", true)]
    #[case("3.3V", true)]
    #[case("1V2", true)]
    #[case("12V", true)]
    #[case("gnd", false)]
    #[case("VCC", false)]
    #[case("+3V3", false)]
    #[case("SIG1", false)]
    fn power_nets_are_a_fixed_list(#[case] label: &str, #[case] power: bool) {
        assert_eq!(Net::new(label).is_power(), power);
    }

    #[test]
    fn connections_skip_power_and_keep_signals() {
        let netlist = board();
        let connections = netlist.elaborate_component_connections("U1", "U2");
        assert_eq!(connections.len(), 1);
        let c = connections[0];
        assert_eq!(netlist.net(c.net).label(), "SIG1");
        assert_eq!(netlist.pin_display(c.pin_a), "U1,1");
        assert_eq!(netlist.pin_display(c.pin_b), "U2,A");
    }

    #[test]
    fn power_net_with_both_components_is_excluded() {
        let mut netlist = board();
        let u1 = netlist.component_by_designator("U1").unwrap().id();
        let u2 = netlist.component_by_designator("U2").unwrap().id();
        let mut gnd = Net::new("GND");
        gnd.add_pin(netlist.component_mut(u1).get_or_create_pin("2"));
        gnd.add_pin(netlist.component_mut(u2).get_or_create_pin("GND"));
        netlist.add_net(gnd);

        let connections = netlist.elaborate_component_connections("U1", "U2");
        assert!(connections
            .iter()
            .all(|c| !netlist.net(c.net).is_power()));
        assert_eq!(connections.len(), 1);
    }

    #[test]
    fn single_pin_net_is_excluded() {
        let mut netlist = board();
        let u1 = netlist.component_by_designator("U1").unwrap().id();
        let mut stub = Net::new("STUB");
        stub.add_pin(netlist.component_mut(u1).get_or_create_pin("3"));
        netlist.add_net(stub);
        netlist.add_net(Net::new("EMPTY"));

        // U1 on both sides would match STUB if single pin nets counted
        let connections = netlist.elaborate_component_connections("U1", "U1");
        assert_eq!(connections.len(), 1);
        assert_eq!(netlist.net(connections[0].net).label(), "SIG1");
        assert_eq!(connections[0].pin_a, connections[0].pin_b);
    }

    #[test]
    fn first_pin_of_a_component_wins() {
        let mut netlist = board();
        let u1 = netlist.component_by_designator("U1").unwrap().id();
        let u2 = netlist.component_by_designator("U2").unwrap().id();
        let mut bus = Net::new("BUS");
        bus.add_pin(netlist.component_mut(u1).get_or_create_pin("7"));
        bus.add_pin(netlist.component_mut(u1).get_or_create_pin("8"));
        bus.add_pin(netlist.component_mut(u2).get_or_create_pin("C"));
        netlist.add_net(bus);

        let connections = netlist.elaborate_component_connections("u1", "u2");
        assert_eq!(connections.len(), 2);
        assert_eq!(netlist.pin_display(connections[1].pin_a), "U1,7");
    }

    #[test]
    fn connections_keep_net_order() {
        let mut netlist = board();
        let u1 = netlist.component_by_designator("U1").unwrap().id();
        let u2 = netlist.component_by_designator("U2").unwrap().id();
        for (label, a, b) in [("SIG2", "4", "D"), ("SIG0", "5", "E")] {
            let mut net = Net::new(label);
            net.add_pin(netlist.component_mut(u2).get_or_create_pin(b));
            net.add_pin(netlist.component_mut(u1).get_or_create_pin(a));
            netlist.add_net(net);
        }

        let first = netlist.elaborate_component_connections("U1", "U2");
        let labels: Vec<_> = first.iter().map(|c| netlist.net(c.net).label()).collect();
        assert_eq!(labels, ["SIG1", "SIG2", "SIG0"]);
        assert_eq!(first, netlist.elaborate_component_connections("U1", "U2"));
    }

    #[test]
    fn unknown_designator_has_no_connections() {
        let netlist = board();
        assert!(netlist
            .elaborate_component_connections("U1", "X9")
            .is_empty());
    }

    #[test]
    fn duplicate_designator_keeps_first() {
        let mut netlist = board();
        let existing = netlist.component_by_designator("U1").unwrap().id();
        assert_eq!(netlist.add_component("u1", "", "Other"), Err(existing));
        assert_eq!(netlist.component(existing).description(), "MCU");
    }

    #[test]
    fn wildcard_designator_is_flagged() {
        let mut netlist = Netlist::new();
        assert!(netlist.add_component("*", "", "").is_ok());
        assert_eq!(
            netlist.diagnostics(),
            [Diagnostic::warning(DiagnosticKind::WildcardDesignator)]
        );
    }

    #[test]
    #[should_panic]
    fn foreign_component_id_panics() {
        let foreign = board().add_component("U3", "", "Other").unwrap();
        Netlist::new().component(foreign);
    }

    #[test]
    #[should_panic]
    fn foreign_net_id_panics() {
        let foreign = board().add_net(Net::new("VCC"));
        Netlist::new().net(foreign);
    }
}
