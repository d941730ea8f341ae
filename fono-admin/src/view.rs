//! Plain-text rendering of page state for the terminal
//!
//! Every function returns a `String` so output can be asserted in tests;
//! `main` only prints.

use std::fmt::Write;

use fono_common::models::{
    EcadStats, EnvioDetail, EnvioSummary, Fonograma, FonogramaSummary, ImportSummary,
};
use fono_common::text::{or_placeholder, truncate_display};
use fono_common::time::format_timestamp;

use crate::import::{ErrorPanel, ReviewGrid};
use crate::pagination::Pagination;
use crate::selection::Selection;

const RULE_WIDTH: usize = 96;

/// Fit a value into a fixed-width column
fn cell(value: Option<&str>, width: usize) -> String {
    let shown = truncate_display(or_placeholder(value), width.saturating_sub(3));
    format!("{:<width$}", shown, width = width)
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

fn rule(out: &mut String) {
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
}

/// Fonograma rows with selection marks; `header_checked` is the header box
pub fn fonograma_table(
    rows: &[FonogramaSummary],
    selection: &Selection,
    header_checked: bool,
) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        out.push_str("Nenhum fonograma encontrado\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{} {:<8} {:<14} {:<30} {:<14} {:<12} {}",
        checkbox(header_checked),
        "ID",
        "ISRC",
        "TÍTULO",
        "GÊNERO",
        "SITUAÇÃO",
        "ECAD"
    );
    rule(&mut out);
    for row in rows {
        let _ = writeln!(
            out,
            "{} {:<8} {} {} {} {} {}",
            checkbox(selection.is_selected(&row.id)),
            row.id.to_string(),
            cell(row.isrc.as_deref(), 14),
            cell(row.titulo.as_deref(), 30),
            cell(row.genero.as_deref(), 14),
            cell(row.situacao.as_deref(), 12),
            row.ecad_status_or_unsent()
        );
    }
    out
}

/// Footer plus the page-number window, current page in brackets
pub fn pagination_bar(pagination: &Pagination) -> String {
    let mut out = pagination.footer();
    if !pagination.has_controls() {
        return out;
    }

    out.push_str("   ");
    if pagination.has_previous() {
        out.push_str("« ");
    }
    let pages: Vec<String> = pagination
        .window()
        .map(|p| {
            if p == pagination.page {
                format!("[{}]", p)
            } else {
                p.to_string()
            }
        })
        .collect();
    out.push_str(&pages.join(" "));
    if pagination.has_next() {
        out.push_str(" »");
    }
    out
}

pub fn selection_status(selection: &Selection) -> String {
    if selection.is_empty() {
        String::new()
    } else {
        format!("{} selecionado(s)", selection.count())
    }
}

pub fn fonograma_detail(fonograma: &Fonograma) -> String {
    let mut out = String::new();
    let field = |out: &mut String, label: &str, value: Option<&str>| {
        let _ = writeln!(out, "{:<20} {}", label, or_placeholder(value));
    };
    let number = |value: Option<i32>| value.map(|v| v.to_string());

    let id = fonograma.id.as_ref().map(|id| id.to_string());
    field(&mut out, "ID", id.as_deref());
    field(&mut out, "ISRC", fonograma.isrc.as_deref());
    field(&mut out, "Título", fonograma.titulo.as_deref());
    field(&mut out, "Título da obra", fonograma.titulo_obra.as_deref());
    field(&mut out, "Duração", fonograma.duracao.as_deref());
    field(&mut out, "Gênero", fonograma.genero.as_deref());
    field(&mut out, "Idioma", fonograma.idioma.as_deref());
    field(&mut out, "Lançamento", number(fonograma.ano_lanc).as_deref());
    field(&mut out, "Gravação", number(fonograma.ano_grav).as_deref());
    field(&mut out, "Produtor", fonograma.prod_nome.as_deref());
    field(&mut out, "Documento", fonograma.prod_doc.as_deref());
    field(&mut out, "Álbum", fonograma.album.as_deref());
    field(&mut out, "Selo", fonograma.selo.as_deref());
    field(&mut out, "Situação", fonograma.situacao.as_deref());
    let status = fonograma.status_ecad.as_ref().map(|s| s.to_string());
    field(&mut out, "Status ECAD", status.as_deref());
    let _ = writeln!(
        out,
        "{:<20} {}",
        "Criado em",
        format_timestamp(fonograma.created_at.as_deref())
    );
    let _ = writeln!(
        out,
        "{:<20} {}",
        "Atualizado em",
        format_timestamp(fonograma.updated_at.as_deref())
    );

    if !fonograma.autores.is_empty() {
        out.push_str("\nAutores\n");
        for autor in &fonograma.autores {
            let _ = writeln!(
                out,
                "  {} ({}) {} {:.2}%",
                autor.nome, autor.cpf, autor.funcao, autor.percentual
            );
        }
    }
    if !fonograma.editoras.is_empty() {
        out.push_str("\nEditoras\n");
        for editora in &fonograma.editoras {
            let _ = writeln!(out, "  {} ({}) {:.2}%", editora.nome, editora.cnpj, editora.percentual);
        }
    }
    if !fonograma.interpretes.is_empty() {
        out.push_str("\nIntérpretes\n");
        for interprete in &fonograma.interpretes {
            let _ = writeln!(
                out,
                "  {} ({}) {} {:.2}%",
                interprete.nome, interprete.doc, interprete.categoria, interprete.percentual
            );
        }
    }
    if !fonograma.musicos.is_empty() {
        out.push_str("\nMúsicos\n");
        for musico in &fonograma.musicos {
            let _ = writeln!(
                out,
                "  {} ({}) {} {:.2}%",
                musico.nome, musico.cpf, musico.instrumento, musico.percentual
            );
        }
    }
    out
}

pub fn import_summary(summary: &ImportSummary) -> String {
    format!(
        "Total de linhas: {}\nLinhas válidas: {}\nLinhas com erro: {}\nTotal de erros: {}\n",
        summary.total_linhas, summary.linhas_validas, summary.linhas_com_erro, summary.total_erros
    )
}

/// The materialized window of the review grid; flagged lines start with `!`
pub fn grid_window(grid: &ReviewGrid) -> String {
    let mut out = String::new();
    if grid.is_empty() {
        return out;
    }

    let headers: Vec<String> = grid.headers().iter().map(|h| cell(Some(h.as_str()), 18)).collect();
    let _ = writeln!(out, "  {:<6} {}", "LINHA", headers.join(" "));
    rule(&mut out);
    for row in grid.window() {
        let cells: Vec<String> = grid
            .columns()
            .iter()
            .map(|column| {
                let value = row.cells.get(column).map(|v| v.to_string());
                cell(value.as_deref(), 18)
            })
            .collect();
        let mark = if row.flagged { "!" } else { " " };
        let _ = writeln!(out, "{} {:<6} {}", mark, row.line, cells.join(" "));
    }
    let range = grid.visible_range();
    let _ = writeln!(
        out,
        "({}-{} de {} linhas)",
        range.start + 1,
        range.end,
        grid.row_count()
    );
    out
}

/// Rendered groups only; collapsed groups show their title line
pub fn error_panel(panel: &ErrorPanel) -> String {
    let mut out = String::new();
    if panel.is_empty() {
        return out;
    }

    for group in panel.rendered() {
        let arrow = if group.is_expanded() { "▾" } else { "▸" };
        let _ = writeln!(out, "{} {} ({})", arrow, group.title(), group.count_label());
        if group.is_expanded() {
            for detail in group.details() {
                let _ = writeln!(
                    out,
                    "    {:<16} {:<34} {}",
                    detail.field, detail.value, detail.message
                );
            }
        }
    }
    if panel.show_more_visible() {
        let _ = writeln!(out, "Mostrar mais ({} linha(s))", panel.hidden_count());
    }
    out
}

pub fn ecad_stats(stats: &EcadStats) -> String {
    let cards = [
        ("Total de envios", stats.total_envios),
        ("Fonogramas enviados", stats.total_fonogramas_enviados),
        ("Aceitos", stats.aceitos()),
        ("Recusados", stats.recusados()),
        ("Pendentes", stats.pendentes()),
    ];
    let mut out = String::new();
    for (label, value) in cards {
        let _ = writeln!(out, "{:<22} {}", label, value);
    }
    out
}

pub fn envio_table(envios: &[EnvioSummary]) -> String {
    let mut out = String::new();
    if envios.is_empty() {
        out.push_str("Nenhum envio realizado\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<6} {:<20} {:<17} {:<8} {:<12} {:>6} {:>8} {:>9}",
        "ID", "PROTOCOLO", "DATA", "FORMATO", "STATUS", "TOTAL", "ACEITOS", "RECUSADOS"
    );
    rule(&mut out);
    for envio in envios {
        let _ = writeln!(
            out,
            "{:<6} {} {:<17} {} {} {:>6} {:>8} {:>9}",
            envio.id.to_string(),
            cell(envio.protocolo.as_deref(), 20),
            format_timestamp(envio.data_envio.as_deref()),
            cell(envio.formato_arquivo.as_deref(), 8),
            cell(envio.status.as_deref(), 12),
            envio.total_fonogramas,
            count_or_placeholder(envio.aceitos),
            count_or_placeholder(envio.recusados)
        );
    }
    out
}

fn count_or_placeholder(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub fn envio_detail(detail: &EnvioDetail) -> String {
    let envio = &detail.envio;
    let mut out = String::new();
    let _ = writeln!(out, "{:<14} {}", "Protocolo", or_placeholder(envio.protocolo.as_deref()));
    let _ = writeln!(out, "{:<14} {}", "Data", format_timestamp(envio.data_envio.as_deref()));
    let _ = writeln!(out, "{:<14} {}", "Tipo", or_placeholder(envio.tipo_envio.as_deref()));
    let _ = writeln!(out, "{:<14} {}", "Método", or_placeholder(envio.metodo.as_deref()));
    let _ = writeln!(out, "{:<14} {}", "Formato", or_placeholder(envio.formato_arquivo.as_deref()));
    let _ = writeln!(out, "{:<14} {}", "Status", or_placeholder(envio.status.as_deref()));
    if let Some(observacoes) = detail.observacoes.as_deref().filter(|o| !o.trim().is_empty()) {
        let _ = writeln!(out, "{:<14} {}", "Observações", observacoes);
    }

    let _ = writeln!(out, "\nFonogramas ({})", detail.fonogramas.len());
    for fonograma in &detail.fonogramas {
        let status = fonograma.status_ecad.as_ref().map(|s| s.to_string());
        let _ = writeln!(
            out,
            "  {} {} {}",
            cell(fonograma.isrc.as_deref(), 14),
            cell(fonograma.titulo.as_deref(), 30),
            or_placeholder(status.as_deref())
        );
    }
    out
}
