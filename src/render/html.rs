use log::debug;

use super::{PlotArtifact, RenderError, Renderer, Result};
use crate::figure::Figure;

/// plotly.js release the generated pages load from the CDN.
pub const PLOTLY_VERSION: &str = "3.0.1";

/// Emits a standalone HTML page drawing the figure with plotly.js.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlRenderer {
    plotly_version: String,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        HtmlRenderer::new(PLOTLY_VERSION)
    }
}

impl HtmlRenderer {
    pub fn new(plotly_version: impl Into<String>) -> HtmlRenderer {
        HtmlRenderer {
            plotly_version: plotly_version.into(),
        }
    }

    pub fn script_url(&self) -> String {
        format!("https://cdn.plot.ly/plotly-{}.min.js", self.plotly_version)
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, figure: &Figure) -> Result<PlotArtifact> {
        figure.check_compatible()?;
        let data = to_script_json(&figure.traces)?;
        let layout = to_script_json(&figure.layout)?;
        let page = page(&self.script_url(), &data, &layout);
        debug!("rendered interactive page of {} bytes", page.len());
        Ok(PlotArtifact::Html(page))
    }
}

/// Serializes `value` for inlining in a `<script>` element. `</` is escaped
/// so user-provided labels cannot close the element.
fn to_script_json<T: serde::Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).map_err(|e| RenderError::Serialize(e.to_string()))?;
    Ok(json.replace("</", "<\\/"))
}

fn page(script_url: &str, data: &str, layout: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Regression Analysis</title>
    <script src="{script_url}" charset="utf-8"></script>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            margin: 0;
            padding: 20px;
            background-color: #f9f9f9;
        }}
        .container {{
            width: 95%;
            max-width: 1200px;
            margin: 0 auto;
            background-color: white;
            padding: 20px;
            box-shadow: 0 0 10px rgba(0,0,0,0.1);
            border-radius: 5px;
        }}
        .plot-title {{
            text-align: center;
            margin-bottom: 20px;
            color: #333;
            font-size: 24px;
        }}
        .plot-container {{
            height: 700px;
            width: 100%;
        }}
    </style>
</head>
<body>
    <div class="container">
        <h1 class="plot-title">Linear Regression Analysis</h1>
        <div id="plot" class="plot-container"></div>
    </div>
    <script>
        window.onload = function() {{
            const data = {data};
            let layout = {layout};

            if (!layout.margin) {{
                layout.margin = {{l: 120, r: 80, b: 120, t: 100, pad: 10}};
            }}
            if (layout.xaxis) {{
                layout.xaxis.automargin = true;
            }}
            if (layout.yaxis) {{
                layout.yaxis.automargin = true;
            }}

            Plotly.newPlot('plot', data, layout, {{
                responsive: true,
                displayModeBar: true,
                displaylogo: false
            }});

            window.addEventListener('resize', function() {{
                Plotly.relayout('plot', {{
                    'width': document.getElementById('plot').offsetWidth
                }});
            }});
        }};
    </script>
</body>
</html>
"#
    )
}
