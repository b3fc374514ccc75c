//! Config generation from a transform graph and a profile.
//!
//! The generator walks the transforms selected by the profile and turns
//! them into OCIO entries:
//!
//! | family                  | becomes                                              |
//! |-------------------------|------------------------------------------------------|
//! | `csc`, `idt`, `inv_idt` | scene colour space, chained to `ACES2065-1`           |
//! | `odt`, `output_transform` | view transform, display colour space, display view |
//! | `lmt`                   | look processed in `ACES2065-1`                        |
//! | `utility`               | named transform                                      |
//!
//! CLF transforms, when supplied, add `FileTransform` based input colour
//! spaces or named transforms. A `Raw` data colour space is always present.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use aces_ctl::{
    ACES_REFERENCE, ClfTransform, CtlTransform, GraphError, OCES, TransformFamily,
    TransformGraph, UNDEFINED_GENUS,
};
use aces_ocio::validate::{self, Severity};
use aces_ocio::{
    ColorSpace, Config, ConfigBuilder, Display, Encoding, FileRule, Look, NamedTransform,
    ReferenceSpace, Transform, View, ViewTransform, role_names,
};
use tracing::{debug, info, trace, warn};

use crate::builtin::{builtin_chain, builtin_for};
use crate::error::{GenerationError, GenerationResult};
use crate::naming::{OutputName, conversion_description, guess_encoding};
use crate::profile::{CompiledProfile, DescriptionStyle, Naming, ProfileSpec};

/// Name of the always-present data colour space and its view.
pub const RAW: &str = "Raw";

/// Generates an OCIO config for one (graph, profile) pair.
///
/// # Example
///
/// ```ignore
/// use aces_config::{ConfigGenerator, ConfigProfile};
///
/// let profile = ConfigProfile::Cg.spec()?;
/// let config = ConfigGenerator::new(&graph, &profile).generate()?;
/// config.write_to_file("cg.ocio")?;
/// ```
#[derive(Debug, Clone)]
pub struct ConfigGenerator<'a> {
    graph: &'a TransformGraph,
    profile: &'a ProfileSpec,
    clf_transforms: &'a [ClfTransform],
    aces_version: Option<String>,
}

/// Entries collected while walking the graph.
#[derive(Default)]
struct Assembly {
    /// Colour-space label to emitted name.
    names: BTreeMap<String, String>,
    /// Lowercase names and aliases already used.
    taken: BTreeSet<String>,
    scene: Vec<ColorSpace>,
    display_spaces: Vec<ColorSpace>,
    view_transforms: Vec<ViewTransform>,
    displays: BTreeMap<String, Display>,
    sdr_view_transforms: Vec<String>,
    looks: Vec<Look>,
    named: Vec<NamedTransform>,
    search_paths: BTreeSet<PathBuf>,
}

impl Assembly {
    /// Reserves a name and its alias; false when either is already used.
    fn reserve(&mut self, name: &str, alias: Option<&str>) -> bool {
        let keys: Vec<String> = std::iter::once(name)
            .chain(alias)
            .map(str::to_lowercase)
            .collect();
        if keys.iter().any(|k| self.taken.contains(k)) {
            return false;
        }
        self.taken.extend(keys);
        true
    }
}

impl<'a> ConfigGenerator<'a> {
    /// Creates a generator.
    pub fn new(graph: &'a TransformGraph, profile: &'a ProfileSpec) -> Self {
        Self {
            graph,
            profile,
            clf_transforms: &[],
            aces_version: None,
        }
    }

    /// Adds CLF transforms to the generated config.
    pub fn with_clf_transforms(mut self, clf_transforms: &'a [ClfTransform]) -> Self {
        self.clf_transforms = clf_transforms;
        self
    }

    /// Overrides the ACES release recorded in the config name.
    pub fn with_aces_version(mut self, version: impl Into<String>) -> Self {
        self.aces_version = Some(version.into());
        self
    }

    /// Config name: `<profile>-config-v<version>_aces-v<aces>_ocio-v<ocio>`.
    pub fn config_name(&self) -> String {
        match &self.aces_version {
            Some(aces) => ProfileSpec {
                aces_version: aces.clone(),
                ..self.profile.clone()
            }
            .config_name(),
            None => self.profile.config_name(),
        }
    }

    /// Builds and validates the config.
    ///
    /// # Errors
    ///
    /// - [`GenerationError::MissingColorSpace`] for a role target or required
    ///   colour space that was not generated
    /// - [`GenerationError::Graph`] when an output has no path from the reference
    /// - [`GenerationError::Validation`] when the result fails validation
    pub fn generate(&self) -> GenerationResult<Config> {
        let compiled = self.profile.compile()?;
        let selected: Vec<&CtlTransform> = self
            .graph
            .transforms()
            .filter(|t| compiled.selects(t.family(), t.name()))
            .map(|t| (t.name(), t))
            .collect::<BTreeMap<&str, &CtlTransform>>()
            .into_values()
            .collect();
        info!(
            profile = %self.profile.name,
            selected = selected.len(),
            total = self.graph.len(),
            clf = self.clf_transforms.len(),
            "Generating config"
        );

        let mut assembly = Assembly::default();
        self.add_fixed_colorspaces(&mut assembly);
        self.add_scene_colorspaces(&compiled, &selected, &mut assembly)?;
        self.add_clf_transforms(&compiled, &mut assembly);
        self.add_outputs(&compiled, &selected, &mut assembly)?;
        self.add_looks_and_named_transforms(&compiled, &selected, &mut assembly);

        let config = self.assemble(&compiled, assembly)?;
        self.check(&config)?;

        info!(
            name = %config.name(),
            colorspaces = config.colorspaces().len(),
            displays = config.displays().displays().len(),
            looks = config.looks().len(),
            named_transforms = config.named_transforms().len(),
            "Generated config"
        );
        Ok(config)
    }

    fn style(&self) -> DescriptionStyle {
        self.profile.description_style
    }

    /// Emitted name for a raw name, with the raw name as alias when they differ.
    fn name_for(&self, compiled: &CompiledProfile, raw: &str) -> (String, Option<String>) {
        match self.profile.naming {
            Naming::Raw => (raw.to_string(), None),
            Naming::Beautified => {
                let pretty = compiled.beautifier.apply(raw);
                if pretty.is_empty() || pretty == raw {
                    (raw.to_string(), None)
                } else {
                    (pretty, Some(raw.to_string()))
                }
            }
        }
    }

    /// View transform, look or named transform name: the transform name,
    /// or its user name (else the beautified short name) when beautifying.
    fn entry_name(&self, compiled: &CompiledProfile, t: &CtlTransform) -> String {
        match self.profile.naming {
            Naming::Raw => t.name().to_string(),
            Naming::Beautified => t
                .user_name()
                .map(str::to_string)
                .unwrap_or_else(|| compiled.beautifier.apply(t.transform_name())),
        }
    }

    fn add_fixed_colorspaces(&self, assembly: &mut Assembly) {
        let reference_description = match self.style() {
            DescriptionStyle::None => String::new(),
            _ => "The Academy Color Encoding System reference color space".to_string(),
        };
        assembly.scene.push(
            ColorSpace::builder(ACES_REFERENCE)
                .family("ACES")
                .category("file-io")
                .category("working-space")
                .encoding(Encoding::SceneLinear)
                .description(reference_description)
                .build(),
        );
        assembly.reserve(ACES_REFERENCE, None);
        assembly.names.insert(ACES_REFERENCE.to_string(), ACES_REFERENCE.to_string());

        let raw_description = match self.style() {
            DescriptionStyle::None => String::new(),
            _ => "The utility \"Raw\" color space".to_string(),
        };
        assembly.scene.push(
            ColorSpace::builder(RAW)
                .family("Utility")
                .category("file-io")
                .encoding(Encoding::Data)
                .is_data(true)
                .description(raw_description)
                .build(),
        );
        assembly.reserve(RAW, None);
        assembly.names.insert(RAW.to_string(), RAW.to_string());
    }

    fn add_scene_colorspaces(
        &self,
        compiled: &CompiledProfile,
        selected: &[&CtlTransform],
        assembly: &mut Assembly,
    ) -> GenerationResult<()> {
        let mut labels: BTreeMap<&str, Vec<&CtlTransform>> = BTreeMap::new();
        for &t in selected {
            if !matches!(
                t.family(),
                TransformFamily::Csc | TransformFamily::Idt | TransformFamily::InvIdt
            ) {
                continue;
            }
            match scene_label(t) {
                Some(label) if label != ACES_REFERENCE && label != OCES => {
                    labels.entry(label).or_default().push(t);
                }
                _ => trace!(transform = %t.name(), "No scene colour space"),
            }
        }

        for (label, contributors) in labels {
            let first = contributors[0];
            let (steps, forward) = match self.graph.conversion_path(label, ACES_REFERENCE) {
                Ok(steps) => (steps, true),
                Err(GraphError::NoPath { .. }) => {
                    (self.graph.conversion_path(ACES_REFERENCE, label)?, false)
                }
                Err(e) => return Err(e.into()),
            };
            let Some(chain) = builtin_chain(&steps) else {
                continue;
            };

            let raw = scene_raw_name(first.genus(), label);
            let (name, alias) = self.name_for(compiled, &raw);
            if !assembly.reserve(&name, alias.as_deref()) {
                warn!(colorspace = %name, transform = %first.name(), "Colour space name already used, skipped");
                continue;
            }

            let fallback = if forward {
                conversion_description(label, ACES_REFERENCE)
            } else {
                conversion_description(ACES_REFERENCE, label)
            };
            let mut builder = ColorSpace::builder(&name)
                .family(scene_family(first))
                .category("file-io")
                .encoding(guess_encoding(label))
                .description(describe(self.style(), &steps, &fallback));
            if first.family() == TransformFamily::Csc {
                builder = builder.category("working-space");
            }
            if let Some(alias) = alias {
                builder = builder.alias(alias);
            }
            builder = if forward {
                builder.to_reference(chain)
            } else {
                builder.from_reference(chain)
            };

            debug!(colorspace = %name, steps = steps.len(), forward, "Scene colour space");
            assembly.scene.push(builder.build());
            assembly.names.insert(label.to_string(), name);
        }
        Ok(())
    }

    fn add_clf_transforms(&self, compiled: &CompiledProfile, assembly: &mut Assembly) {
        for clf in self.clf_transforms {
            if compiled.exclude.iter().any(|r| r.is_match(clf.name())) {
                trace!(clf = %clf.name(), "Excluded");
                continue;
            }
            let Some(file_name) = clf.path().file_name() else {
                continue;
            };
            let file = Transform::file(PathBuf::from(file_name));
            let description = match self.style() {
                DescriptionStyle::None => String::new(),
                _ => clf.description().to_string(),
            };
            let family = match clf.genus() {
                UNDEFINED_GENUS => clf.family().to_string(),
                genus => format!("{}/{genus}", clf.family()),
            };

            let endpoints = clf.source().zip(clf.target());
            let scene = match &endpoints {
                Some((src, dst)) if dst == ACES_REFERENCE && src != ACES_REFERENCE => {
                    Some((src.clone(), true))
                }
                Some((src, dst)) if src == ACES_REFERENCE && dst != ACES_REFERENCE => {
                    Some((dst.clone(), false))
                }
                _ => None,
            };

            match scene {
                Some((label, _)) if assembly.names.contains_key(&label) => {
                    warn!(clf = %clf.name(), colorspace = %label, "Colour space already generated, CLF skipped");
                    continue;
                }
                Some((label, forward)) => {
                    let (name, alias) = self.name_for(compiled, &label);
                    if !assembly.reserve(&name, alias.as_deref()) {
                        warn!(colorspace = %name, clf = %clf.name(), "Colour space name already used, skipped");
                        continue;
                    }
                    let mut builder = ColorSpace::builder(&name)
                        .family(family)
                        .category("file-io")
                        .encoding(guess_encoding(&label))
                        .description(description);
                    if let Some(alias) = alias {
                        builder = builder.alias(alias);
                    }
                    builder = if forward {
                        builder.to_reference(file)
                    } else {
                        builder.from_reference(file)
                    };
                    assembly.scene.push(builder.build());
                    assembly.names.insert(label, name);
                }
                None => {
                    let (name, alias) = self.name_for(compiled, clf.name());
                    if !assembly.reserve(&name, alias.as_deref()) {
                        warn!(named_transform = %name, "Name already used, CLF skipped");
                        continue;
                    }
                    let mut named = NamedTransform::new(&name, file);
                    named.family = family;
                    named.description = description;
                    named.aliases.extend(alias);
                    assembly.named.push(named);
                }
            }

            if let Some(dir) = clf.path().parent() {
                assembly.search_paths.insert(dir.to_path_buf());
            }
            debug!(clf = %clf.name(), "CLF transform");
        }
    }

    fn add_outputs(
        &self,
        compiled: &CompiledProfile,
        selected: &[&CtlTransform],
        assembly: &mut Assembly,
    ) -> GenerationResult<()> {
        for &t in selected {
            if !matches!(
                t.family(),
                TransformFamily::Odt | TransformFamily::OutputTransform
            ) {
                continue;
            }
            let Some(label) = t.target() else {
                continue;
            };
            let steps = self.graph.conversion_path(ACES_REFERENCE, label)?;
            let Some(chain) = builtin_chain(&steps) else {
                continue;
            };

            let output = OutputName::parse(label);
            let key = output.display_key();
            let (display_name, _) = self.name_for(compiled, &key);
            let display_cs = format!("{display_name} - Display");

            let view_name = output.view_name();
            if assembly
                .displays
                .get(&display_name)
                .is_some_and(|d| d.view(&view_name).is_some())
            {
                warn!(display = %display_name, view = %view_name, transform = %t.name(), "View already defined, skipped");
                continue;
            }

            let vt_name = self.entry_name(compiled, t);
            if assembly.view_transforms.iter().any(|vt| vt.name() == vt_name) {
                warn!(view_transform = %vt_name, transform = %t.name(), "View transform name already used, skipped");
                continue;
            }

            if !assembly.displays.contains_key(&display_name) {
                let alias = match self.profile.naming {
                    Naming::Beautified => Some(format!("{key} - Display")).filter(|a| *a != display_cs),
                    Naming::Raw => None,
                };
                if !assembly.reserve(&display_cs, alias.as_deref()) {
                    warn!(colorspace = %display_cs, "Display colour space name already used, skipped");
                    continue;
                }
                let description = match self.style() {
                    DescriptionStyle::None => String::new(),
                    _ => format!("Display encoding of the {display_name} outputs"),
                };
                let mut builder = ColorSpace::builder(&display_cs)
                    .family("Display")
                    .category("file-io")
                    .encoding(output.encoding())
                    .reference_space(ReferenceSpace::Display)
                    .description(description);
                if let Some(alias) = alias {
                    builder = builder.alias(alias);
                }
                assembly.display_spaces.push(builder.build());
                assembly
                    .displays
                    .insert(display_name.clone(), Display::new(&display_name));
            }

            let fallback = conversion_description(ACES_REFERENCE, label);
            assembly.view_transforms.push(
                ViewTransform::new(&vt_name)
                    .with_family("ACES")
                    .with_description(describe(self.style(), &steps, &fallback))
                    .with_from_scene_reference(chain),
            );
            if !output.is_hdr() && output.qualifiers.is_empty() {
                assembly.sdr_view_transforms.push(vt_name.clone());
            }
            if let Some(display) = assembly.displays.get_mut(&display_name) {
                display.add_view(View::with_view_transform(&view_name, &vt_name, &display_cs));
            }
            debug!(display = %display_name, view = %view_name, view_transform = %vt_name, "Output");
        }
        Ok(())
    }

    fn add_looks_and_named_transforms(
        &self,
        compiled: &CompiledProfile,
        selected: &[&CtlTransform],
        assembly: &mut Assembly,
    ) {
        for &t in selected {
            if !matches!(t.family(), TransformFamily::Lmt | TransformFamily::Utility) {
                continue;
            }
            let name = self.entry_name(compiled, t);
            let description = describe(self.style(), &[t], t.transform_name());
            match t.family() {
                TransformFamily::Lmt => {
                    if assembly.looks.iter().any(|l| l.name() == name) {
                        warn!(look = %name, "Look name already used, skipped");
                        continue;
                    }
                    assembly.looks.push(
                        Look::new(&name)
                            .with_process_space(ACES_REFERENCE)
                            .with_description(description)
                            .with_transform(builtin_for(t)),
                    );
                    debug!(look = %name, "Look");
                }
                TransformFamily::Utility => {
                    if !assembly.reserve(&name, None) {
                        warn!(named_transform = %name, "Name already used, skipped");
                        continue;
                    }
                    let mut named = NamedTransform::new(&name, builtin_for(t));
                    named.family = "Utility".to_string();
                    named.description = description;
                    if let Some(src) = t.source() {
                        named.encoding = guess_encoding(src);
                    }
                    assembly.named.push(named);
                    debug!(named_transform = %name, "Named transform");
                }
                _ => {}
            }
        }
    }

    fn resolve(&self, assembly: &Assembly, label: &str, usage: String) -> GenerationResult<String> {
        assembly
            .names
            .get(label)
            .cloned()
            .ok_or_else(|| GenerationError::MissingColorSpace {
                profile: self.profile.name.clone(),
                name: label.to_string(),
                usage,
            })
    }

    fn assemble(&self, compiled: &CompiledProfile, assembly: Assembly) -> GenerationResult<Config> {
        for label in &self.profile.required {
            self.resolve(&assembly, label, "required colour spaces".to_string())?;
        }
        let mut roles: BTreeMap<String, String> = BTreeMap::new();
        for (role, label) in &self.profile.roles {
            let name = self.resolve(&assembly, label, format!("role '{role}'"))?;
            roles.insert(role.clone(), name);
        }
        roles
            .entry(role_names::REFERENCE.to_string())
            .or_insert_with(|| ACES_REFERENCE.to_string());
        let default_space = roles
            .get(role_names::DEFAULT)
            .cloned()
            .unwrap_or_else(|| ACES_REFERENCE.to_string());

        let mut builder = ConfigBuilder::new(self.config_name())
            .description(self.profile.description.clone())
            .version(compiled.version);
        for path in &assembly.search_paths {
            builder = builder.search_path(path.clone());
        }

        let inactive: Vec<String> = assembly
            .display_spaces
            .iter()
            .chain(&assembly.scene)
            .map(|cs| cs.name())
            .filter(|name| compiled.is_inactive(name))
            .map(str::to_string)
            .collect();

        builder = builder
            .add_colorspaces(assembly.display_spaces)
            .add_colorspaces(assembly.scene);
        for (role, name) in roles {
            builder = builder.set_role(role, name);
        }

        let mut active_views: Vec<String> = Vec::new();
        let active_displays: Vec<String> = assembly.displays.keys().cloned().collect();
        for (_, mut display) in assembly.displays {
            display.add_view(View::new(RAW, RAW));
            for view in display.view_names() {
                if !active_views.iter().any(|v| v == view) {
                    active_views.push(view.to_string());
                }
            }
            builder = builder.add_display(display);
        }

        let default_vt = assembly
            .sdr_view_transforms
            .first()
            .cloned()
            .or_else(|| assembly.view_transforms.first().map(|vt| vt.name().to_string()));
        for vt in assembly.view_transforms {
            builder = builder.add_view_transform(vt);
        }
        if let Some(vt) = default_vt {
            builder = builder.default_view_transform(vt);
        }
        for look in assembly.looks {
            builder = builder.add_look(look);
        }
        for named in assembly.named {
            builder = builder.add_named_transform(named);
        }

        Ok(builder
            .active_displays(active_displays)
            .active_views(active_views)
            .inactive_colorspaces(inactive)
            .add_file_rule(FileRule::default_rule(default_space))
            .build()?)
    }

    fn check(&self, config: &Config) -> GenerationResult<()> {
        let issues = validate::check(config);
        let mut errors = Vec::new();
        for issue in &issues {
            match issue.severity {
                Severity::Error => errors.push(issue.to_string()),
                Severity::Warning => warn!(issue = %issue, "Validation"),
                Severity::Info => debug!(issue = %issue, "Validation"),
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GenerationError::Validation { issues: errors })
        }
    }
}

/// Colour space a CSC or input transform contributes.
fn scene_label(t: &CtlTransform) -> Option<&str> {
    match (t.source()?, t.target()?) {
        (source, ACES_REFERENCE) => Some(source),
        (ACES_REFERENCE, target) => Some(target),
        (source, _) => Some(source),
    }
}

fn scene_raw_name(genus: &str, label: &str) -> String {
    match genus {
        "Academy" | UNDEFINED_GENUS => label.to_string(),
        vendor => format!("{vendor} - {label}"),
    }
}

fn scene_family(t: &CtlTransform) -> String {
    match (t.family(), t.genus()) {
        (TransformFamily::Csc, "Academy") => "ACES".to_string(),
        (TransformFamily::Csc, genus) => format!("CSC/{genus}"),
        (_, UNDEFINED_GENUS) => "Input".to_string(),
        (_, genus) => format!("Input/{genus}"),
    }
}

/// Description text for an entry built from `transforms`.
fn describe(style: DescriptionStyle, transforms: &[&CtlTransform], fallback: &str) -> String {
    let blocks = || {
        transforms
            .iter()
            .map(|t| t.description())
            .filter(|d| !d.is_empty())
            .collect::<Vec<_>>()
    };
    let short = || {
        let names: Vec<&str> = transforms.iter().filter_map(|t| t.user_name()).collect();
        if names.is_empty() {
            fallback.to_string()
        } else {
            names.join("\n")
        }
    };
    let long = || {
        let blocks = blocks();
        if blocks.is_empty() {
            fallback.to_string()
        } else {
            blocks.join("\n\n")
        }
    };
    let union = |head: String| {
        let mut tags: Vec<String> = Vec::new();
        for t in transforms {
            if let Some(id) = t.id() {
                tags.push(format!("ACEStransformID: {id}"));
            }
            if let Some(name) = t.user_name() {
                tags.push(format!("ACESuserName: {name}"));
            }
        }
        if tags.is_empty() {
            head
        } else {
            format!("{head}\n\n{}", tags.join("\n"))
        }
    };

    match style {
        DescriptionStyle::None => String::new(),
        DescriptionStyle::Aces => blocks().join("\n\n"),
        DescriptionStyle::Opencolorio => fallback.to_string(),
        DescriptionStyle::Short => short(),
        DescriptionStyle::Long => long(),
        DescriptionStyle::ShortUnion => union(short()),
        DescriptionStyle::LongUnion => union(long()),
    }
}
