// Parameter Resolver
// Turns a script's token list into the concrete argument list it is launched with

use crate::config::InterpreterPaths;
use crate::error::{PipelineError, PipelineResult};
use crate::params::ParameterStore;
use crate::topology::{ScriptSpec, Stage, Token};

use serde::Serialize;

use std::fmt;
use std::path::{Path, PathBuf};

/// Concrete command for one script invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCommand {
    /// Script name, for reporting
    pub script: String,
    /// Interpreter executable
    pub program: String,
    /// Location of the script file
    pub script_path: String,
    /// Resolved parameter values, in token order
    pub args: Vec<String>,
}

impl ResolvedCommand {
    /// Full argument vector: program, script path, then parameters
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        [self.program.as_str(), self.script_path.as_str()]
            .into_iter()
            .chain(self.args.iter().map(String::as_str))
    }
}

impl fmt::Display for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let argv: Vec<&str> = self.argv().collect();
        f.write_str(&argv.join(" "))
    }
}

/// Resolves script specs against the global parameter store
#[derive(Debug, Clone)]
pub struct ParameterResolver {
    scripts_dir: PathBuf,
    interpreters: InterpreterPaths,
}

impl ParameterResolver {
    pub fn new(scripts_dir: impl Into<PathBuf>, interpreters: InterpreterPaths) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
            interpreters,
        }
    }

    /// Where a script lives: `<scripts>/<stage>[/<subfolder>]/<script>`
    pub fn script_path(&self, stage: &Stage, script: &ScriptSpec) -> PathBuf {
        let mut path = self.scripts_dir.join(stage.name());
        if let Some(subfolder) = script.subfolder() {
            path.push(subfolder);
        }
        path.push(script.name());
        path
    }

    /// Build the command for `script` in `stage`
    pub fn resolve(
        &self,
        stage: &Stage,
        script: &ScriptSpec,
        params: &ParameterStore,
    ) -> PipelineResult<ResolvedCommand> {
        let args = script
            .tokens()
            .iter()
            .map(|token| resolve_token(token, params))
            .collect::<PipelineResult<Vec<_>>>()?;

        let command = ResolvedCommand {
            script: script.name().to_string(),
            program: self.interpreters.program(script.interpreter()).to_string(),
            script_path: path_to_string(&self.script_path(stage, script)),
            args,
        };

        tracing::debug!(script = script.name(), command = %command, "resolved command");
        Ok(command)
    }
}

/// Resolve one token to its argument string
pub fn resolve_token(token: &Token, params: &ParameterStore) -> PipelineResult<String> {
    match token {
        Token::GlobalRef(key) => params
            .get(key)
            .map(str::to_string)
            .ok_or_else(|| PipelineError::MissingRequiredParameter(key.clone())),
        Token::Literal(flag) => Ok(flag.clone()),
        Token::PathTemplate(relative) => Ok(format!("{}/{}", params.output_dir()?, relative)),
    }
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{virallink_topology, PipelineTopology, MANDATORY_PARAMETERS};

    fn resolver() -> ParameterResolver {
        ParameterResolver::new("scripts", InterpreterPaths::default())
    }

    fn single_script(spec: crate::topology::ScriptSpecBuilder) -> PipelineTopology {
        PipelineTopology::builder()
            .stage("1_x", |s| s.script(spec))
            .build()
    }

    fn full_store() -> ParameterStore {
        ParameterStore::from_pairs(MANDATORY_PARAMETERS.iter().map(|key| {
            let value = if *key == "outdir" {
                "/out".to_string()
            } else {
                format!("value-of-{}", key)
            };
            (*key, value)
        }))
    }

    #[test]
    fn test_resolve_mixed_tokens() {
        let topology = single_script(
            ScriptSpec::python("filter_expression_gaussian.py")
                .infer(["-i", "1_x/counts.txt", "-of", "outdir"], MANDATORY_PARAMETERS),
        );
        let stage = &topology.stages()[0];
        let params = ParameterStore::from_pairs([("outdir", "/out")]);

        let command = resolver()
            .resolve(stage, &stage.scripts()[0], &params)
            .unwrap();

        assert_eq!(command.program, "python3");
        assert_eq!(command.script_path, "scripts/1_x/filter_expression_gaussian.py");
        assert_eq!(command.args, vec!["-i", "/out/1_x/counts.txt", "-of", "/out"]);
    }

    #[test]
    fn test_short_global_key_is_substituted() {
        let topology = single_script(ScriptSpec::rscript("a.R").infer(["id"], &["id", "outdir"]));
        let stage = &topology.stages()[0];
        let params = ParameterStore::from_pairs([("id", "uniprot"), ("outdir", "/out")]);

        let command = resolver()
            .resolve(stage, &stage.scripts()[0], &params)
            .unwrap();
        assert_eq!(command.args, vec!["uniprot"]);
    }

    #[test]
    fn test_path_template_anchored_exactly() {
        let params = ParameterStore::from_pairs([("outdir", "relative/out/")]);
        let resolved = resolve_token(
            &Token::PathTemplate("4_create_network/node_table.txt".to_string()),
            &params,
        )
        .unwrap();
        // No normalisation: outdir + "/" + token
        assert_eq!(resolved, "relative/out//4_create_network/node_table.txt");
    }

    #[test]
    fn test_missing_global_key() {
        let params = ParameterStore::from_pairs([("outdir", "/out")]);
        let err = resolve_token(&Token::GlobalRef("hbps".to_string()), &params).unwrap_err();
        assert!(matches!(err, PipelineError::MissingRequiredParameter(key) if key == "hbps"));
    }

    #[test]
    fn test_path_template_without_outdir() {
        let params = ParameterStore::from_pairs([("counts", "c.txt")]);
        let err = resolve_token(&Token::PathTemplate("1_x/a.txt".to_string()), &params)
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingRequiredParameter(key) if key == "outdir"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let topology = virallink_topology();
        let params = full_store();
        let resolver = resolver();

        for stage in topology.stages() {
            for script in stage.scripts() {
                let first = resolver.resolve(stage, script, &params).unwrap();
                let second = resolver.resolve(stage, script, &params).unwrap();
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn test_tiedie_script_location() {
        let topology = virallink_topology();
        let (stage, script) = topology.find_script("tiedie.py").unwrap();

        let command = resolver().resolve(stage, script, &full_store()).unwrap();
        assert_eq!(
            command.script_path,
            "scripts/3_network_diffusion/TieDie/tiedie.py"
        );
        assert_eq!(command.args.last().unwrap(), "/out/3_network_diffusion/TieDIE");
    }

    #[test]
    fn test_interpreter_override() {
        let interpreters = InterpreterPaths {
            rscript: "/opt/R/bin/Rscript".to_string(),
            python: "python3".to_string(),
        };
        let resolver = ParameterResolver::new("/srv/scripts", interpreters);
        let topology = virallink_topology();
        let (stage, script) = topology.find_script("diff_expression_deseq2.R").unwrap();

        let command = resolver.resolve(stage, script, &full_store()).unwrap();
        assert_eq!(command.program, "/opt/R/bin/Rscript");
        assert_eq!(
            command.script_path,
            "/srv/scripts/1_process_expression_data/diff_expression_deseq2.R"
        );
        assert_eq!(
            command.args,
            vec![
                "value-of-counts",
                "value-of-meta",
                "/out",
                "value-of-lfccutoff",
                "value-of-pcutoff"
            ]
        );
    }

    #[test]
    fn test_display_joins_argv() {
        let command = ResolvedCommand {
            script: "a.R".to_string(),
            program: "Rscript".to_string(),
            script_path: "scripts/1_x/a.R".to_string(),
            args: vec!["/out".to_string()],
        };
        assert_eq!(command.to_string(), "Rscript scripts/1_x/a.R /out");
    }
}
