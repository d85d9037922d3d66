//! Parser for pci.ids and usb.ids
//!
//! Parsing happens in two passes: first every line is classified on its own
//! (by indentation and ID width), then the flat list of lines is folded into
//! the vendor and class trees.

use std::hash::Hash;
use std::ops::ControlFlow;

use ahash::AHashMap;
use itertools::PutBack;
use winnow::ModalResult;
use winnow::Parser;
use winnow::ascii::alpha1;
use winnow::ascii::hex_uint;
use winnow::ascii::newline;
use winnow::ascii::space1;
use winnow::combinator::alt;
use winnow::combinator::opt;
use winnow::combinator::separated;
use winnow::combinator::trace;
use winnow::error::ContextError;
use winnow::error::StrContext;
use winnow::stream::AsChar;
use winnow::token::take;
use winnow::token::take_till;

use super::Class;
use super::Device;
use super::IdDb;
use super::ProgrammingInterface;
use super::Subclass;
use super::Subsystem;
use super::Vendor;

/// One classified line
#[derive(Debug, PartialEq, Eq)]
enum Line<'input> {
    Class(Entry<'input, u8>),
    Subclass(Entry<'input, u8>),
    /// Also matches USB interface lines below a device
    ProgrammingInterface(Entry<'input, u8>),

    Vendor(Entry<'input, u16>),
    Device(Entry<'input, u16>),
    /// Keyed on subvendor and subdevice
    Subsystem(Entry<'input, (u16, u16)>),

    /// Start of a section we don't care about (e.g. `HID` in usb.ids)
    Section(&'input str),
    /// Indented line that doesn't fit any of the above
    Other,
}

impl Line<'_> {
    fn is_indented(&self) -> bool {
        matches!(
            self,
            Line::Subclass(_)
                | Line::ProgrammingInterface(_)
                | Line::Device(_)
                | Line::Subsystem(_)
                | Line::Other
        )
    }
}

/// An ID and the name given to it
#[derive(Debug, PartialEq, Eq)]
struct Entry<'input, Id> {
    id: Id,
    name: &'input str,
}

/// Error from the line classification pass
#[derive(Debug, PartialEq, Eq)]
pub struct ParseIdsError {
    message: String,
    line: usize,
    text: String,
}

impl ParseIdsError {
    fn from_parse<'input>(
        error: &winnow::error::ParseError<&'input str, ContextError>,
        input: &'input str,
    ) -> Self {
        let pos = error.offset();
        let start = input[..pos].rfind('\n').map_or(0, |idx| idx + 1);
        let text = input[start..].lines().next().unwrap_or_default();
        Self {
            message: error.inner().to_string(),
            line: input[..pos].matches('\n').count() + 1,
            text: text.to_owned(),
        }
    }

    /// Line number (1-based) of the offending line
    pub fn line(&self) -> usize {
        self.line
    }
}

impl std::fmt::Display for ParseIdsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse line {}: {}", self.line, self.text)?;
        if !self.message.is_empty() {
            write!(f, " ({})", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseIdsError {}

pub(super) fn parse_database(input: &str) -> eyre::Result<IdDb> {
    let lines = parse_file
        .parse(input)
        .map_err(|error| ParseIdsError::from_parse(&error, input))?;
    build_hierarchy(&lines)
}

type Lines<'a, 'input> = PutBack<std::slice::Iter<'a, Line<'input>>>;

/// Fold the classified lines into trees.
///
/// Going up a level needs one line of lookahead, which [`itertools::put_back`]
/// provides: the first line that doesn't belong to the current parent is put
/// back for the level above.
fn build_hierarchy(lines: &[Line<'_>]) -> eyre::Result<IdDb> {
    let mut db = IdDb::default();
    let mut lines = itertools::put_back(lines.iter());

    while let Some(line) = lines.next() {
        match line {
            Line::Class(class) => {
                let subclasses = children(&mut lines, |line, lines| {
                    let Line::Subclass(subclass) = line else {
                        return ControlFlow::Break(());
                    };
                    let program_interfaces = children(lines, |line, _| match line {
                        Line::ProgrammingInterface(prog_if) => {
                            let name = prog_if.name.to_owned();
                            let prog_if_entry = ProgrammingInterface { name };
                            ControlFlow::Continue(Some((prog_if.id, prog_if_entry)))
                        }
                        _ => ControlFlow::Break(()),
                    });
                    let subclass_entry = Subclass {
                        name: subclass.name.to_owned(),
                        program_interfaces,
                    };
                    ControlFlow::Continue(Some((subclass.id, subclass_entry)))
                });
                let name = class.name.to_owned();
                db.classes.insert(class.id, Class { name, subclasses });
            }
            Line::Vendor(vendor) => {
                let devices = children(&mut lines, |line, lines| {
                    let Line::Device(device) = line else {
                        return ControlFlow::Break(());
                    };
                    let subsystems = children(lines, |line, _| match line {
                        Line::Subsystem(subsystem) => {
                            let name = subsystem.name.to_owned();
                            ControlFlow::Continue(Some((subsystem.id, Subsystem { name })))
                        }
                        // USB interface, not kept
                        Line::ProgrammingInterface(_) => ControlFlow::Continue(None),
                        _ => ControlFlow::Break(()),
                    });
                    let name = device.name.to_owned();
                    ControlFlow::Continue(Some((device.id, Device { name, subsystems })))
                });
                let name = vendor.name.to_owned();
                db.vendors.insert(vendor.id, Vendor { name, devices });
            }
            Line::Section(kind) => {
                tracing::trace!("Skipping section {kind}");
                while let Some(line) = lines.next() {
                    if !line.is_indented() {
                        lines.put_back(line);
                        break;
                    }
                }
            }
            Line::Subclass(_)
            | Line::ProgrammingInterface(_)
            | Line::Device(_)
            | Line::Subsystem(_)
            | Line::Other => eyre::bail!("Unexpected line at top level: {line:?}"),
        }
    }

    Ok(db)
}

/// Collect the children of the line just consumed.
///
/// `child` gets each following line and decides: `Continue(Some(..))` keeps
/// it, `Continue(None)` drops it and `Break` ends the children (that line is
/// put back).
fn children<'a, 'input, K, V, F>(
    lines: &mut Lines<'a, 'input>,
    mut child: F,
) -> AHashMap<K, V>
where
    K: Eq + Hash,
    F: FnMut(&'a Line<'input>, &mut Lines<'a, 'input>) -> ControlFlow<(), Option<(K, V)>>,
{
    let mut found = AHashMap::new();
    while let Some(line) = lines.next() {
        match child(line, lines) {
            ControlFlow::Continue(Some((key, value))) => {
                found.insert(key, value);
            }
            ControlFlow::Continue(None) => {}
            ControlFlow::Break(()) => {
                lines.put_back(line);
                break;
            }
        }
    }
    found
}

fn parse_file<'input>(i: &mut &'input str) -> ModalResult<Vec<Line<'input>>> {
    let line = alt((
        ('#', string).map(|_| None).context(StrContext::Label("comment")),
        subsystem
            .map(|e| Some(Line::Subsystem(e)))
            .context(StrContext::Label("subsystem")),
        indented(2, hex2)
            .map(|e| Some(Line::ProgrammingInterface(e)))
            .context(StrContext::Label("prog_if")),
        indented(1, hex4)
            .map(|e| Some(Line::Device(e)))
            .context(StrContext::Label("device")),
        indented(1, hex2)
            .map(|e| Some(Line::Subclass(e)))
            .context(StrContext::Label("subclass")),
        indented(0, hex4)
            .map(|e| Some(Line::Vendor(e)))
            .context(StrContext::Label("vendor")),
        ('C', space1, indented(0, hex2))
            .map(|(_, _, e)| Some(Line::Class(e)))
            .context(StrContext::Label("class")),
        // Must come after vendor and class
        (alpha1, ' ', string)
            .map(|(kind, _, _)| Some(Line::Section(kind)))
            .context(StrContext::Label("section")),
        ('\t', string)
            .map(|_| Some(Line::Other))
            .context(StrContext::Label("other")),
        // Blank line, must be last
        "".map(|_| None).context(StrContext::Label("blank")),
    ));
    (separated(0.., line, newline), opt(newline))
        .map(|(lines, _): (Vec<Option<Line<'input>>>, _)| {
            lines.into_iter().flatten().collect()
        })
        .parse_next(i)
}

/// `depth` tabs, an ID, spacing and the name
fn indented<'input, Id>(
    depth: usize,
    id: impl Parser<&'input str, Id, winnow::error::ErrMode<ContextError>>,
) -> impl Parser<&'input str, Entry<'input, Id>, winnow::error::ErrMode<ContextError>> {
    let tabs = take(depth).verify(|t: &str| t.bytes().all(|b| b == b'\t'));
    trace(
        "indented",
        (tabs, id, space1, string).map(|(_, id, _, name)| Entry { id, name }),
    )
}

fn subsystem<'input>(i: &mut &'input str) -> ModalResult<Entry<'input, (u16, u16)>> {
    let parser = ("\t\t", hex4, space1, hex4, space1, string).map(
        |(_, subvendor, _, subdevice, _, name)| Entry {
            id: (subvendor, subdevice),
            name,
        },
    );
    trace("subsystem", parser).parse_next(i)
}

/// Rest of the line
fn string<'input>(i: &mut &'input str) -> ModalResult<&'input str> {
    trace("string", take_till(0.., '\n')).parse_next(i)
}

fn hex2(i: &mut &str) -> ModalResult<u8> {
    trace("hex2", take(2usize).verify(is_hex))
        .and_then(hex_uint::<_, u8, _>)
        .parse_next(i)
}

fn hex4(i: &mut &str) -> ModalResult<u16> {
    trace("hex4", take(4usize).verify(is_hex))
        .and_then(hex_uint::<_, u16, _>)
        .parse_next(i)
}

fn is_hex(s: &str) -> bool {
    s.bytes().all(AsChar::is_hex_digit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn entry<Id>(id: Id, name: &str) -> Entry<'_, Id> {
        Entry { id, name }
    }

    #[test]
    fn test_build_hierarchy() {
        let lines = vec![
            Line::Vendor(entry(0x0001, "Lonely vendor")),
            Line::Vendor(entry(0x0014, "Busy vendor")),
            Line::Device(entry(0x0001, "Widget")),
            Line::Subsystem(entry((0x001c, 0x0004), "OEM widget")),
            Line::ProgrammingInterface(entry(0x00, "Widget interface")),
            Line::Device(entry(0x0002, "Gadget")),
            Line::Section("HUT"),
            Line::Other,
            Line::Subclass(entry(0x01, "Skipped with the section")),
            Line::Class(entry(0x06, "Bridge")),
            Line::Subclass(entry(0x04, "PCI bridge")),
            Line::ProgrammingInterface(entry(0x01, "Subtractive decode")),
            Line::Subclass(entry(0x80, "Bridge")),
        ];

        let db = build_hierarchy(&lines).unwrap();

        assert_eq!(db.vendors.len(), 2);
        assert!(db.vendors[&0x0001].devices.is_empty());
        let busy = &db.vendors[&0x0014];
        assert_eq!(busy.name, "Busy vendor");
        assert_eq!(busy.devices.len(), 2);
        assert_eq!(
            busy.devices[&0x0001].subsystems,
            AHashMap::from([((0x001c, 0x0004), Subsystem {
                name: "OEM widget".into()
            })])
        );
        assert!(busy.devices[&0x0002].subsystems.is_empty());

        assert_eq!(db.classes.len(), 1);
        let bridge = &db.classes[&0x06];
        assert_eq!(bridge.subclasses.len(), 2);
        assert_eq!(
            bridge.subclasses[&0x04].program_interfaces[&0x01].name,
            "Subtractive decode"
        );
        assert!(bridge.subclasses[&0x80].program_interfaces.is_empty());
    }

    #[test]
    fn test_stray_line() {
        let lines = vec![Line::Device(entry(0x8139, "Orphan"))];
        assert!(build_hierarchy(&lines).is_err());
    }

    // No trailing newline on purpose
    const TEST_DATA: &str = indoc! {
"0001  Some ID
# A Comment
\t8139  A device
\t\t001c 0004  Sub device
\t\t01  An interface

C 01  CB
\t01  CB 1
\t\t05  CB 1 5
HID 22  Report
\t000  Odd
L 0009  English
\t01  US"};

    #[test]
    fn test_parse_file() {
        let parsed = parse_file.parse(TEST_DATA).unwrap();

        assert_eq!(
            parsed,
            vec![
                Line::Vendor(entry(0x0001, "Some ID")),
                Line::Device(entry(0x8139, "A device")),
                Line::Subsystem(entry((0x001c, 0x0004), "Sub device")),
                Line::ProgrammingInterface(entry(0x01, "An interface")),
                Line::Class(entry(0x01, "CB")),
                Line::Subclass(entry(0x01, "CB 1")),
                Line::ProgrammingInterface(entry(0x05, "CB 1 5")),
                Line::Section("HID"),
                Line::Other,
                Line::Section("L"),
                Line::Subclass(entry(0x01, "US")),
            ]
        );

        let db = parse_database(TEST_DATA).unwrap();
        assert_eq!(db.vendors.len(), 1);
        assert_eq!(db.classes.len(), 1);
        assert_eq!(db.vendors[&1].devices[&0x8139].name, "A device");
    }

    #[test]
    fn test_parse_error() {
        let err = parse_database("0001  Some ID\n!!\n").unwrap_err();
        let err = err.downcast_ref::<ParseIdsError>().unwrap();
        assert_eq!(err.line(), 2);
        assert!(err.to_string().starts_with("Failed to parse line 2: !!"));
    }

    #[test]
    fn test_single_lines() {
        let line = |s: &'static str| parse_file.parse(s).unwrap();
        assert_eq!(
            line("C 00  Something"),
            vec![Line::Class(entry(0, "Something"))]
        );
        assert_eq!(
            line("\t0f  Some string"),
            vec![Line::Subclass(entry(0x0f, "Some string"))]
        );
        assert_eq!(line("BIAS 0  Undefined"), vec![Line::Section("BIAS")]);
        assert_eq!(line("\t\t\t01  Too deep"), vec![Line::Other]);
        assert_eq!(line("# comment\n\n"), vec![]);
    }
}
