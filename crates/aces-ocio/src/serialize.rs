//! OCIO v2 YAML emission.
//!
//! The output follows the layout OpenColorIO itself writes: verbatim
//! `!<Tag>` markers, flow mappings for short nodes and block literals for
//! descriptions. Empty optional fields are left out, so emitting the same
//! [`Config`] twice always gives the same bytes.

use std::path::Path;

use tracing::debug;

use crate::colorspace::{ColorSpace, Encoding, ReferenceSpace};
use crate::config::{Config, FileRule, NamedTransform};
use crate::display::{View, ViewTarget, ViewTransform};
use crate::error::OcioResult;
use crate::look::Look;
use crate::transform::{Transform, TransformDirection};

impl Config {
    /// Serializes the config as an OCIO v2 document.
    pub fn to_yaml_string(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("ocio_profile_version: {}\n\n", self.version));
        out.push_str("environment:\n  {}\n");
        if !self.search_paths.is_empty() {
            let joined: Vec<String> = self
                .search_paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            out.push_str(&format!("search_path: {}\n", scalar(&joined.join(":"))));
        }
        out.push_str("strictparsing: true\n");
        if !self.name.is_empty() {
            out.push_str(&format!("name: {}\n", scalar(&self.name)));
        }
        write_description(&mut out, "", &self.description);

        if !self.roles.is_empty() {
            out.push_str("\nroles:\n");
            for (role, cs) in self.roles.iter() {
                out.push_str(&format!("  {}: {}\n", scalar(role), scalar(cs)));
            }
        }

        if !self.file_rules.is_empty() {
            out.push_str("\nfile_rules:\n");
            for rule in &self.file_rules {
                out.push_str(&format!("  - !<Rule> {}\n", file_rule(rule)));
            }
        }

        let displays = &self.displays;
        if !displays.shared_views().is_empty() {
            out.push_str("\nshared_views:\n");
            for view in displays.shared_views() {
                out.push_str(&format!("  - !<View> {}\n", view_node(view)));
            }
        }

        if !displays.displays().is_empty() {
            out.push_str("\ndisplays:\n");
            for display in displays.displays() {
                out.push_str(&format!("  {}:\n", scalar(display.name())));
                for view in display.views() {
                    out.push_str(&format!("    - !<View> {}\n", view_node(view)));
                }
                if !display.shared_views().is_empty() {
                    out.push_str(&format!("    - !<Views> {}\n", flow_list(display.shared_views())));
                }
            }
        }

        out.push('\n');
        out.push_str(&format!("active_displays: {}\n", flow_list(&self.active_displays)));
        out.push_str(&format!("active_views: {}\n", flow_list(&self.active_views)));
        if !self.inactive_colorspaces.is_empty() {
            out.push_str(&format!(
                "inactive_colorspaces: {}\n",
                flow_list(&self.inactive_colorspaces)
            ));
        }

        if !self.looks.is_empty() {
            out.push_str("\nlooks:\n");
            for look in &self.looks {
                write_look(&mut out, look);
            }
        }

        if let Some(vt) = displays.default_view_transform() {
            out.push_str(&format!("\ndefault_view_transform: {}\n", scalar(vt)));
        }

        if !displays.view_transforms().is_empty() {
            out.push_str("\nview_transforms:\n");
            for vt in displays.view_transforms() {
                write_view_transform(&mut out, vt);
            }
        }

        let display_spaces: Vec<&ColorSpace> =
            self.colorspaces_in(ReferenceSpace::Display).collect();
        if !display_spaces.is_empty() {
            out.push_str("\ndisplay_colorspaces:\n");
            for cs in display_spaces {
                write_colorspace(&mut out, cs);
            }
        }

        let scene_spaces: Vec<&ColorSpace> = self.colorspaces_in(ReferenceSpace::Scene).collect();
        if !scene_spaces.is_empty() {
            out.push_str("\ncolorspaces:\n");
            for cs in scene_spaces {
                write_colorspace(&mut out, cs);
            }
        }

        if !self.named_transforms.is_empty() {
            out.push_str("\nnamed_transforms:\n");
            for nt in &self.named_transforms {
                write_named_transform(&mut out, nt);
            }
        }

        out
    }

    /// Writes the config to `path`.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> OcioResult<()> {
        let path = path.as_ref();
        let yaml = self.to_yaml_string();
        std::fs::write(path, &yaml)?;
        debug!(path = %path.display(), bytes = yaml.len(), "Wrote OCIO config");
        Ok(())
    }
}

fn file_rule(rule: &FileRule) -> String {
    let mut fields = vec![
        format!("name: {}", scalar(&rule.name)),
        format!("colorspace: {}", scalar(&rule.colorspace)),
    ];
    if let Some(pattern) = &rule.pattern {
        fields.push(format!("pattern: {}", scalar(pattern)));
    }
    if let Some(ext) = &rule.extension {
        fields.push(format!("extension: {}", scalar(ext)));
    }
    format!("{{{}}}", fields.join(", "))
}

fn view_node(view: &View) -> String {
    let mut fields = vec![format!("name: {}", scalar(view.name()))];
    match view.target() {
        ViewTarget::ColorSpace(cs) => fields.push(format!("colorspace: {}", scalar(cs))),
        ViewTarget::ViewTransform {
            view_transform,
            display_colorspace,
        } => {
            fields.push(format!("view_transform: {}", scalar(view_transform)));
            fields.push(format!("display_colorspace: {}", scalar(display_colorspace)));
        }
    }
    if let Some(looks) = view.looks() {
        fields.push(format!("looks: {}", scalar(looks)));
    }
    if let Some(rule) = view.rule() {
        fields.push(format!("rule: {}", scalar(rule)));
    }
    if !view.description().is_empty() {
        fields.push(format!("description: {}", quoted(view.description())));
    }
    format!("{{{}}}", fields.join(", "))
}

fn write_look(out: &mut String, look: &Look) {
    out.push_str("  - !<Look>\n");
    out.push_str(&format!("    name: {}\n", scalar(look.name())));
    if let Some(ps) = &look.process_space {
        out.push_str(&format!("    process_space: {}\n", scalar(ps)));
    }
    write_description(out, "    ", &look.description);
    if let Some(t) = &look.transform {
        write_transform_field(out, "    ", "transform", t);
    }
    if let Some(t) = &look.inverse_transform {
        write_transform_field(out, "    ", "inverse_transform", t);
    }
}

fn write_view_transform(out: &mut String, vt: &ViewTransform) {
    out.push_str("  - !<ViewTransform>\n");
    out.push_str(&format!("    name: {}\n", scalar(vt.name())));
    if !vt.family().is_empty() {
        out.push_str(&format!("    family: {}\n", scalar(vt.family())));
    }
    if !vt.categories().is_empty() {
        out.push_str(&format!("    categories: {}\n", flow_list(vt.categories())));
    }
    write_description(out, "    ", vt.description());
    if let Some(t) = vt.from_scene_reference() {
        write_transform_field(out, "    ", "from_scene_reference", t);
    }
    if let Some(t) = vt.to_scene_reference() {
        write_transform_field(out, "    ", "to_scene_reference", t);
    }
}

fn write_colorspace(out: &mut String, cs: &ColorSpace) {
    out.push_str("  - !<ColorSpace>\n");
    out.push_str(&format!("    name: {}\n", scalar(cs.name())));
    if !cs.aliases().is_empty() {
        out.push_str(&format!("    aliases: {}\n", flow_list(cs.aliases())));
    }
    if !cs.family().is_empty() {
        out.push_str(&format!("    family: {}\n", scalar(cs.family())));
    }
    write_description(out, "    ", cs.description());
    out.push_str(&format!("    isdata: {}\n", cs.is_data()));
    if !cs.categories().is_empty() {
        out.push_str(&format!("    categories: {}\n", flow_list(cs.categories())));
    }
    if cs.encoding() != Encoding::Unknown {
        out.push_str(&format!("    encoding: {}\n", cs.encoding().as_str()));
    }

    let (to_key, from_key) = match cs.reference_space() {
        ReferenceSpace::Scene => ("to_scene_reference", "from_scene_reference"),
        ReferenceSpace::Display => ("to_display_reference", "from_display_reference"),
    };
    if let Some(t) = cs.to_reference() {
        write_transform_field(out, "    ", to_key, t);
    }
    if let Some(t) = cs.from_reference() {
        write_transform_field(out, "    ", from_key, t);
    }
}

fn write_named_transform(out: &mut String, nt: &NamedTransform) {
    out.push_str("  - !<NamedTransform>\n");
    out.push_str(&format!("    name: {}\n", scalar(&nt.name)));
    if !nt.aliases.is_empty() {
        out.push_str(&format!("    aliases: {}\n", flow_list(&nt.aliases)));
    }
    if !nt.family.is_empty() {
        out.push_str(&format!("    family: {}\n", scalar(&nt.family)));
    }
    if !nt.categories.is_empty() {
        out.push_str(&format!("    categories: {}\n", flow_list(&nt.categories)));
    }
    if nt.encoding != Encoding::Unknown {
        out.push_str(&format!("    encoding: {}\n", nt.encoding.as_str()));
    }
    write_description(out, "    ", &nt.description);
    if let Some(t) = &nt.transform {
        write_transform_field(out, "    ", "transform", t);
    }
    if let Some(t) = &nt.inverse_transform {
        write_transform_field(out, "    ", "inverse_transform", t);
    }
}

/// Writes `key: <transform>` at `indent`; groups expand into block form.
fn write_transform_field(out: &mut String, indent: &str, key: &str, t: &Transform) {
    out.push_str(&format!("{indent}{key}: "));
    write_transform(out, indent, t);
}

fn write_transform(out: &mut String, indent: &str, t: &Transform) {
    match t {
        Transform::Group(g) => {
            out.push_str("!<GroupTransform>\n");
            if g.direction == TransformDirection::Inverse {
                out.push_str(&format!("{indent}  direction: inverse\n"));
            }
            out.push_str(&format!("{indent}  children:\n"));
            let child_indent = format!("{indent}    ");
            for child in &g.transforms {
                out.push_str(&format!("{indent}    - "));
                write_transform(out, &child_indent, child);
            }
        }
        other => {
            out.push_str(&inline_transform(other));
            out.push('\n');
        }
    }
}

/// Flow form of a non-group transform.
fn inline_transform(t: &Transform) -> String {
    let mut fields = Vec::new();
    let direction = match t {
        Transform::Builtin(b) => {
            fields.push(format!("style: {}", scalar(&b.style)));
            b.direction
        }
        Transform::File(f) => {
            fields.push(format!("src: {}", scalar(&f.src.to_string_lossy())));
            f.direction
        }
        Transform::ColorSpace(c) => {
            fields.push(format!("src: {}", scalar(&c.src)));
            fields.push(format!("dst: {}", scalar(&c.dst)));
            c.direction
        }
        Transform::Matrix(m) => {
            fields.push(format!("matrix: {}", float_list(&m.matrix)));
            if m.offset.iter().any(|v| *v != 0.0) {
                fields.push(format!("offset: {}", float_list(&m.offset)));
            }
            m.direction
        }
        Transform::Group(g) => g.direction,
    };
    if direction == TransformDirection::Inverse {
        fields.push("direction: inverse".to_string());
    }
    format!("!<{}> {{{}}}", t.tag(), fields.join(", "))
}

/// Writes a `description:` field as a block literal; nothing when empty.
fn write_description(out: &mut String, indent: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    if text.starts_with([' ', '\t', '\n']) {
        out.push_str(&format!("{indent}description: {}\n", quoted(text)));
        return;
    }
    out.push_str(&format!("{indent}description: |-\n"));
    for line in text.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!("{indent}  {line}\n"));
        }
    }
}

fn flow_list<S: AsRef<str>>(items: &[S]) -> String {
    let parts: Vec<String> = items.iter().map(|s| scalar(s.as_ref())).collect();
    format!("[{}]", parts.join(", "))
}

fn float_list(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v}")).collect();
    format!("[{}]", parts.join(", "))
}

/// Emits a string as a plain scalar when YAML reads it back unchanged,
/// double-quoted otherwise.
pub(crate) fn scalar(s: &str) -> String {
    if needs_quotes(s) {
        quoted(s)
    } else {
        s.to_string()
    }
}

fn needs_quotes(s: &str) -> bool {
    const SPECIAL: &[char] = &[
        ':', '#', ',', '[', ']', '{', '}', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`', '<',
        '\\', '\n', '\t',
    ];
    if s.is_empty() || s.trim() != s {
        return true;
    }
    if s.contains(SPECIAL) || s.starts_with(['-', '?', '~']) {
        return true;
    }
    let lower = s.to_ascii_lowercase();
    if matches!(lower.as_str(), "true" | "false" | "yes" | "no" | "on" | "off" | "null") {
        return true;
    }
    s.parse::<f64>().is_ok()
}

fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
