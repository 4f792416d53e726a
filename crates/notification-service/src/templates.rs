use crate::MentionDigest;
use mention_core::MentionReport;

pub struct EmailTemplate;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl EmailTemplate {
    pub fn render(digest: &MentionDigest) -> String {
        let sections: String = digest.reports.iter().map(Self::render_report).collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1"></head>
<body style="margin:0;padding:0;background:#f1f5f9;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;">
<table width="100%" cellpadding="0" cellspacing="0" style="background:#f1f5f9;padding:32px 0;">
  <tr><td align="center">
    <table width="600" cellpadding="0" cellspacing="0" style="background:#ffffff;border-radius:8px;overflow:hidden;box-shadow:0 1px 3px rgba(0,0,0,0.1);">
      <tr><td>
        <div style="background:#1e293b;color:#fff;padding:12px 20px;font-size:18px;font-weight:700;">{title}</div>
        {sections}
      </td></tr>
      <tr><td style="padding:16px 20px;border-top:1px solid #e2e8f0;">
        <p style="margin:0;color:#94a3b8;font-size:12px;">
          {summary}
          <br>Sent at {ts} UTC
        </p>
      </td></tr>
    </table>
    <p style="color:#94a3b8;font-size:11px;margin-top:16px;">Ticker Watch</p>
  </td></tr>
</table>
</body>
</html>"#,
            title = escape(&digest.title),
            summary = digest.summary(),
            ts = digest.timestamp.format("%Y-%m-%d %H:%M:%S"),
        )
    }

    /// Plain-text alternative for mail clients that skip HTML.
    pub fn render_text(digest: &MentionDigest) -> String {
        let mut out = format!("{}\n\n", digest.title);
        for report in &digest.reports {
            out.push_str(&format!(
                "@{} #{}: {}\n",
                report.author, report.message_id, report.result.text
            ));
            for m in &report.result.mentions {
                out.push_str(&format!(
                    "  {} ({}) matched \"{}\" by {} at {:.2}\n",
                    m.symbol.as_deref().unwrap_or("-"),
                    m.proper_name.as_deref().unwrap_or("-"),
                    m.matched_text,
                    m.strategy,
                    m.score
                ));
            }
            out.push('\n');
        }
        out.push_str(&format!(
            "{}\nSent at {} UTC\n",
            digest.summary(),
            digest.timestamp.format("%Y-%m-%d %H:%M:%S")
        ));
        out
    }

    fn render_report(report: &MentionReport) -> String {
        let rows: String = report
            .result
            .mentions
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let shade = if i % 2 == 1 { r#" style="background:#f8fafc;""# } else { "" };
                format!(
                    r#"<tr{shade}><td style="padding:8px 12px;font-weight:600;">{symbol}</td><td style="padding:8px 12px;">{name}</td><td style="padding:8px 12px;">{text}</td><td style="padding:8px 12px;color:#64748b;">{strategy}</td><td style="padding:8px 12px;font-weight:600;">{score:.2}</td></tr>"#,
                    symbol = escape(m.symbol.as_deref().unwrap_or("-")),
                    name = escape(m.proper_name.as_deref().unwrap_or("-")),
                    text = escape(&m.matched_text),
                    strategy = m.strategy,
                    score = m.score,
                )
            })
            .collect();

        format!(
            r#"<div style="padding:16px 20px 4px;">
  <p style="margin:0 0 4px;color:#64748b;font-size:13px;">@{author} &middot; #{id}</p>
  <p style="margin:0;color:#334155;">{text}</p>
</div>
<table style="width:100%;border-collapse:collapse;">
  <tr style="color:#94a3b8;text-align:left;"><th style="padding:8px 12px;">Symbol</th><th style="padding:8px 12px;">Company</th><th style="padding:8px 12px;">Matched</th><th style="padding:8px 12px;">Strategy</th><th style="padding:8px 12px;">Score</th></tr>
  {rows}
</table>"#,
            author = escape(&report.author),
            id = report.message_id,
            text = escape(&report.result.text),
        )
    }
}
