use crate::{
    raw::{ComponentBlock, Line, NetBlock, TangoFile},
    Diagnostic, DiagnosticKind, Net, Netlist,
};

fn malformed(line: usize, reason: impl Into<String>) -> Diagnostic {
    Diagnostic::warning(DiagnosticKind::MalformedBlock {
        line,
        reason: reason.into(),
    })
}

/// Lines of a block starting at the first non-blank one
fn content<'b, 'a>(lines: &'b [Line<'a>]) -> &'b [Line<'a>] {
    let start = lines
        .iter()
        .position(|l| !l.text.trim().is_empty())
        .unwrap_or(lines.len());
    &lines[start..]
}

/// Split a `designator,pin` net entry
fn net_entry(text: &str) -> Option<(&str, &str)> {
    let (designator, pin) = text.split_once(',')?;
    let (designator, pin) = (designator.trim(), pin.trim());
    if designator.is_empty() || pin.is_empty() || pin.contains(',') {
        return None;
    }
    Some((designator, pin))
}

impl Netlist {
    /// Add the components, then the nets, of a parsed file
    pub(crate) fn populate(&mut self, file: TangoFile) {
        let TangoFile {
            components,
            nets,
            unterminated,
        } = file;

        for line in unterminated {
            self.record(malformed(line, "block is not terminated, skipping"));
        }
        for block in &components {
            self.add_component_block(block);
        }
        tracing::debug!("Found {} components", self.component_count());
        for block in &nets {
            self.add_net_block(block);
        }
    }

    fn add_component_block(&mut self, block: &ComponentBlock) {
        let [designator, footprint, description, ..] = content(&block.lines) else {
            self.record(malformed(
                block.line,
                "component block needs designator, footprint and description, skipping",
            ));
            return;
        };
        if self
            .add_component(designator.text, footprint.text, description.text)
            .is_err()
        {
            self.record(Diagnostic::warning(DiagnosticKind::DuplicateDesignator {
                line: block.line,
                designator: designator.text.trim().to_owned(),
            }));
            return;
        }
        tracing::trace!(
            "{}: {} ({})",
            designator.text.trim(),
            description.text.trim(),
            footprint.text.trim()
        );
    }

    fn add_net_block(&mut self, block: &NetBlock) {
        let [label, entries @ ..] = content(&block.lines) else {
            self.record(malformed(block.line, "net block has no label, skipping"));
            return;
        };
        let label = label.text.trim();
        let mut net = Net::new(label);

        for entry in entries {
            if entry.text.trim().is_empty() {
                continue;
            }
            let Some((designator, pin)) = net_entry(entry.text) else {
                self.record(malformed(
                    entry.number,
                    format!(
                        "net '{label}' entry '{}' is not 'designator,pin', skipping",
                        entry.text.trim()
                    ),
                ));
                continue;
            };
            let Some(id) = self.id_of(designator) else {
                self.record(Diagnostic::error(DiagnosticKind::DanglingReference {
                    line: entry.number,
                    net: label.to_owned(),
                    designator: designator.to_owned(),
                }));
                continue;
            };
            let pin = self.component_mut(id).get_or_create_pin(pin);
            net.add_pin(pin);
        }

        tracing::debug!(
            "{} pin(s) are connected to net '{}': {:?}",
            net.pins().len(),
            net.label(),
            net.pins()
                .iter()
                .map(|&pin| self.pin_display(pin))
                .collect::<Vec<_>>()
        );
        self.add_net(net);
    }
}
