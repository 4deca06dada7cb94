// ViralLink Topology
// The fixed six-stage pipeline and the parameters it cannot run without

use crate::topology::models::PipelineTopology;
use crate::topology::models::ScriptSpec;

/// Parameters that must be present before any stage starts
pub const MANDATORY_PARAMETERS: &[&str] = &[
    "counts",
    "meta",
    "lfccutoff",
    "pcutoff",
    "id_type",
    "hbps",
    "sars",
    "outdir",
    "anubixreactome",
];

/// Directory name the diffusion tool creates for its own output
pub const TIEDIE_SENTINEL: &str = "TieDIE";

/// Build the ViralLink pipeline.
///
/// Order matters: every output-relative path below is written by a script in
/// an earlier position.
pub fn virallink_topology() -> PipelineTopology {
    PipelineTopology::builder()
        .stage("1_process_expression_data", |s| {
            s.script(
                ScriptSpec::rscript("diff_expression_deseq2.R")
                    .global("counts")
                    .global("meta")
                    .global("outdir")
                    .global("lfccutoff")
                    .global("pcutoff"),
            )
            .script(
                ScriptSpec::python("filter_expression_gaussian.py")
                    .flag("-i")
                    .path("1_process_expression_data/counts_normalised_deseq2_test.txt")
                    .flag("-of")
                    .global("outdir"),
            )
        })
        .stage("2_process_a_priori_networks", |s| {
            s.script(ScriptSpec::rscript("Downloading_omnipath_dorothea.R").global("outdir"))
                .script(
                    ScriptSpec::rscript("filter_network_expressed_genes.R")
                        .path("1_process_expression_data/expressed_genes.txt")
                        .path("2_process_a_priori_networks/unprocessed_networks/dorothea_abc_signed_directed.txt")
                        .path("2_process_a_priori_networks/unprocessed_networks/omnipath_signed_directed.txt")
                        .global("id_type")
                        .global("outdir"),
                )
                .script(
                    ScriptSpec::rscript("get_regulator_deg_network.R")
                        .path("2_process_a_priori_networks/dorothea_contextualised_network.txt")
                        .path("1_process_expression_data/deseq2_res_condition_test_vs_control_filtered.csv")
                        .global("id_type")
                        .global("outdir"),
                )
        })
        .stage("3_network_diffusion", |s| {
            s.script(
                ScriptSpec::rscript("prepare_tiedie_input.R")
                    .path("2_process_a_priori_networks/omnipath_contextualised_network.txt")
                    .path("2_process_a_priori_networks/contextualised_regulator-deg_network.txt")
                    .path("1_process_expression_data/deseq2_res_condition_test_vs_control_filtered.csv")
                    .global("hbps")
                    .global("outdir"),
            )
            .script(
                ScriptSpec::python("tiedie.py")
                    .subfolder("TieDie")
                    .flag("-u")
                    .path("3_network_diffusion/input_files/upstream.input")
                    .flag("-d")
                    .path("3_network_diffusion/input_files/downstream.input")
                    .flag("-n")
                    .path("3_network_diffusion/input_files/pathway.sif")
                    .flag("-o")
                    .path("3_network_diffusion/TieDIE"),
            )
        })
        .stage("4_create_network", |s| {
            s.script(
                ScriptSpec::rscript("combined_edge_node_tables.R")
                    .path("3_network_diffusion/TieDIE/tiedie.cn.sif")
                    .path("3_network_diffusion/TieDIE/heats.NA")
                    .global("hbps")
                    .global("sars")
                    .path("2_process_a_priori_networks/contextualised_regulator-deg_network.txt")
                    .path("1_process_expression_data/deseq2_res_condition_test_vs_control.csv")
                    .global("id_type")
                    .global("outdir"),
            )
        })
        .stage("5_betweenness_and_cluster_analysis", |s| {
            s.script(
                ScriptSpec::rscript("betweenness_and_clustering.R")
                    .path("4_create_network/final_network.txt")
                    .path("4_create_network/node_table.txt")
                    .global("outdir"),
            )
            .script(
                ScriptSpec::rscript("cytoscape_visualisation.R")
                    .path("4_create_network/final_network.txt")
                    .path("5_betweenness_and_cluster_analysis/node_table_betweenness_clusters.txt")
                    .global("outdir"),
            )
        })
        .stage("6_functional_analysis", |s| {
            s.script(
                ScriptSpec::rscript("network_functional_analysis.R")
                    .path("4_create_network/node_table.txt")
                    .path("2_process_a_priori_networks/omnipath_contextualised_network.txt")
                    .path("2_process_a_priori_networks/dorothea_contextualised_network.txt")
                    .global("outdir"),
            )
            .script(
                ScriptSpec::rscript("cluster_functional_analysis.R")
                    .path("5_betweenness_and_cluster_analysis/node_table_betweenness_clusters.txt")
                    .path("2_process_a_priori_networks/omnipath_contextualised_network.txt")
                    .global("outdir"),
            )
            .script(
                ScriptSpec::rscript("network_aware_functional_analysis.R")
                    .path("4_create_network/node_table.txt")
                    .path("2_process_a_priori_networks/omnipath_contextualised_network.txt")
                    .global("anubixreactome")
                    .global("outdir"),
            )
            .script(ScriptSpec::rscript("reformat_functional_result.R").global("outdir"))
        })
        .build()
}
