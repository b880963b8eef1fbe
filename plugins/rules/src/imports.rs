use crate::layout::canonical_layout;
use anyhow::{anyhow, Result};
use glob::Pattern;
use importguard_core::{ConfigurationSnapshot, GuardConfig, LayoutSegment, SettingKey};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImportKind {
    Class,
    Static,
    Module,
}

/// One `import` line. `path` is what follows the keywords, without `;`.
/// `comment` is a trailing `//` comment, kept with the line it was on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportStatement {
    pub path: String,
    pub kind: ImportKind,
    pub comment: Option<String>,
}

impl ImportStatement {
    /// Package an import belongs to, for layout matching. Modules have none.
    pub fn package(&self) -> Option<&str> {
        let owner_depth = match self.kind {
            ImportKind::Module => return None,
            ImportKind::Class => 1,
            ImportKind::Static => 2,
        };

        let mut package = self.path.as_str();
        for _ in 0..owner_depth {
            package = package.rsplit_once('.').map_or("", |(head, _)| head);
        }
        Some(package)
    }

    pub fn render(&self) -> String {
        let statement = match self.kind {
            ImportKind::Class => format!("import {};", self.path),
            ImportKind::Static => format!("import static {};", self.path),
            ImportKind::Module => format!("import module {};", self.path),
        };
        match &self.comment {
            Some(comment) => format!("{} {}", statement, comment),
            None => statement,
        }
    }
}

/// Rewrites the import block of a Java source file
pub trait ImportOptimizer {
    /// Organised source. Sources without imports come back unchanged.
    fn optimize(&self, source: &str) -> Result<String>;
}

/// Orders imports by an import layout table
pub struct LayoutImportOptimizer {
    layout: Vec<LayoutSegment>,
    separate_static: bool,
    statement: Regex,
}

impl LayoutImportOptimizer {
    pub fn new(layout: Vec<LayoutSegment>, separate_static: bool) -> Result<Self> {
        let statement = Regex::new(
            r"^\s*import\s+(?:(static|module)\s+)?([A-Za-z_$][\w$]*(?:\s*\.\s*[A-Za-z_$][\w$]*)*(?:\s*\.\s*\*)?)\s*;\s*(//.*)?$",
        )?;
        Ok(Self {
            layout,
            separate_static,
            statement,
        })
    }

    /// Layout and static separation as the host currently has them
    pub fn from_snapshot(snapshot: &ConfigurationSnapshot) -> Result<Self> {
        let layout = snapshot
            .layout(SettingKey::ImportLayoutOrder)
            .map(|layout| layout.to_vec())
            .unwrap_or_else(|| canonical_layout(snapshot.supports_module_imports()));
        let separate_static = snapshot.bool(SettingKey::LayoutStaticImportsSeparately).unwrap_or(true);
        Self::new(layout, separate_static)
    }

    fn is_import_line(line: &str) -> bool {
        let trimmed = line.trim_start();
        trimmed == "import" || trimmed.starts_with("import ") || trimmed.starts_with("import\t")
    }

    fn parse_line(&self, number: usize, line: &str) -> Result<ImportStatement> {
        let captures = self
            .statement
            .captures(line)
            .ok_or_else(|| anyhow!("line {}: unrecognised import statement '{}'", number, line.trim()))?;

        let kind = match captures.get(1).map(|m| m.as_str()) {
            Some("static") => ImportKind::Static,
            Some(_) => ImportKind::Module,
            None => ImportKind::Class,
        };
        let path: String = captures[2].chars().filter(|c| !c.is_whitespace()).collect();
        let comment = captures.get(3).map(|m| m.as_str().trim_end().to_string());

        Ok(ImportStatement { path, kind, comment })
    }

    /// Segment index an import belongs to; `layout.len()` is the overflow
    /// group for imports the layout has no place for.
    fn group_of(&self, import: &ImportStatement) -> usize {
        let find = |wanted: &LayoutSegment| self.layout.iter().position(|s| s == wanted);
        let all_other = find(&LayoutSegment::AllOtherImports);
        let overflow = self.layout.len();

        let package = match import.package() {
            Some(package) => package,
            None => {
                return self
                    .layout
                    .iter()
                    .position(LayoutSegment::is_module_imports)
                    .or(all_other)
                    .unwrap_or(overflow)
            }
        };

        let statics_apart = import.kind == ImportKind::Static && self.separate_static;
        let best = self
            .layout
            .iter()
            .enumerate()
            .filter_map(|(index, segment)| match segment {
                LayoutSegment::PackageGroup {
                    prefix,
                    static_import,
                    with_subpackages,
                } if *static_import == statics_apart && package_matches(package, prefix, *with_subpackages) => {
                    Some((prefix.len(), index))
                }
                _ => None,
            })
            // longest prefix, earliest segment on ties
            .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        if let Some((_, index)) = best {
            return index;
        }

        if statics_apart {
            find(&LayoutSegment::AllOtherStaticImports)
                .or(all_other)
                .unwrap_or(overflow)
        } else {
            all_other.unwrap_or(overflow)
        }
    }

    /// Organised import lines, blank separators included
    pub fn organize(&self, imports: impl IntoIterator<Item = ImportStatement>) -> Vec<String> {
        // duplicates collapse onto the first occurrence, comment included
        let mut unique: BTreeMap<(String, ImportKind), ImportStatement> = BTreeMap::new();
        for import in imports {
            unique.entry((import.path.clone(), import.kind)).or_insert(import);
        }

        let mut groups: Vec<Vec<&ImportStatement>> = vec![Vec::new(); self.layout.len() + 1];
        for import in unique.values() {
            groups[self.group_of(import)].push(import);
        }

        let mut lines = Vec::new();
        let mut blank_pending = false;
        for (index, group) in groups.iter().enumerate() {
            match self.layout.get(index) {
                Some(LayoutSegment::BlankLine) => {
                    blank_pending = !lines.is_empty();
                    continue;
                }
                None if !lines.is_empty() => blank_pending = true,
                _ => {}
            }

            if group.is_empty() {
                continue;
            }
            if blank_pending {
                lines.push(String::new());
                blank_pending = false;
            }
            lines.extend(group.iter().map(|import| import.render()));
        }

        lines
    }
}

fn package_matches(package: &str, prefix: &str, with_subpackages: bool) -> bool {
    if package == prefix {
        return true;
    }
    with_subpackages
        && package
            .strip_prefix(prefix)
            .map_or(false, |rest| rest.starts_with('.'))
}

impl ImportOptimizer for LayoutImportOptimizer {
    fn optimize(&self, source: &str) -> Result<String> {
        let lines: Vec<&str> = source.lines().collect();

        let first = match lines.iter().position(|line| Self::is_import_line(line)) {
            Some(first) => first,
            None => return Ok(source.to_string()),
        };

        let mut imports = Vec::new();
        let mut last = first;
        let mut block_closed = false;
        for (index, line) in lines.iter().enumerate().skip(first) {
            if Self::is_import_line(line) {
                if block_closed {
                    return Err(anyhow!(
                        "line {}: import after non-import content at line {}",
                        index + 1,
                        last + 2
                    ));
                }
                imports.push(self.parse_line(index + 1, line)?);
                last = index;
            } else if !line.trim().is_empty() {
                block_closed = true;
            }
        }

        let mut out: Vec<String> = lines[..first].iter().map(|l| l.to_string()).collect();
        out.extend(self.organize(imports));
        out.extend(lines[last + 1..].iter().map(|l| l.to_string()));

        let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };
        let mut organised = out.join(newline);
        if source.ends_with('\n') {
            organised.push_str(newline);
        }
        Ok(organised)
    }
}

/// Java files under `root` whose relative path matches `pattern`, skipping
/// ignored directories
pub fn matching_java_files(root: &Path, pattern: &str, config: &GuardConfig) -> Result<Vec<PathBuf>> {
    let glob_pattern = Pattern::new(pattern)?;
    let mut files = Vec::new();

    let walker = WalkDir::new(root).follow_links(true).into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !entry.file_type().is_dir()
            || !entry.file_name().to_str().map_or(false, |name| config.is_ignored(name))
    });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.path().extension().map_or(true, |ext| ext != "java") {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            if glob_pattern.matches_path(relative) {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Organise one file in place. Returns whether it changed.
pub fn organize_file(optimizer: &dyn ImportOptimizer, path: &Path) -> Result<bool> {
    let source = std::fs::read_to_string(path)?;
    let organised = optimizer
        .optimize(&source)
        .map_err(|e| anyhow!("{}: {}", path.display(), e))?;

    if organised == source {
        return Ok(false);
    }
    std::fs::write(path, organised)?;
    tracing::debug!("Organised imports in {}", path.display());
    Ok(true)
}
