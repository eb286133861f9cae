//! The HTML envelope layered around a rendered body for email delivery.

use crate::request::NotificationRequest;

/// Wraps an already-rendered body in the email envelope: a severity-colored
/// status banner, the body, up to two action buttons, a timestamp line and
/// a footer naming the sending site.
pub fn render_email_envelope(
    request: &NotificationRequest,
    body_html: &str,
    site_name: &str,
) -> String {
    let severity = request.severity;
    let timestamp = request.created_at.format("%Y-%m-%d %H:%M:%S");

    let mut html = format!(
        r#"<body style="color: #666; font-size: 14px; font-family: 'Open Sans',Helvetica,Arial,sans-serif;">
<div class="box-content" style="margin: 20px auto; max-width: 600px;">
    <div class="header-tip" style="font-size: 12px;color: #aaa;text-align: right;padding-right: 25px;padding-bottom: 10px;">{site_name}</div>
    <div class="info-top" style="padding: 15px 25px;border-top-left-radius: 10px;border-top-right-radius: 10px;background: {banner};color: #fff;overflow: hidden;line-height: 32px;">
        <div style="color:#FFFFFF"><strong>{emoji} {title}</strong></div>
        <div style="font-size: 14px; margin-top: 5px;"><strong>{status}</strong></div>
    </div>
    <div class="info-wrap" style="border:1px solid #ddd;overflow: hidden;padding: 15px 15px 20px;">
        <div class="tips" style="padding:15px;"><p style="margin: 10px 0;">{body_html}</p></div>
"#,
        banner = severity.banner_color(),
        emoji = severity.emoji(),
        status = severity.status_word(),
        title = request.title,
    );

    if request.action_left.is_some() || request.action_right.is_some() {
        html.push_str(r#"<div class="actions" style="text-align: center; margin: 20px 0;">"#);
        if let Some(action) = &request.action_left {
            html.push_str(&format!(
                r#"<a href="{}" style="display: inline-block; margin: 0 10px; padding: 8px 16px; background-color: #4CAF50; color: white; text-decoration: none; border-radius: 4px;">{}</a>"#,
                action.url, action.label
            ));
        }
        if let Some(action) = &request.action_right {
            html.push_str(&format!(
                r#"<a href="{}" style="display: inline-block; margin: 0 10px; padding: 8px 16px; background-color: #2196F3; color: white; text-decoration: none; border-radius: 4px;">{}</a>"#,
                action.url, action.label
            ));
        }
        html.push_str("</div>");
    }

    html.push_str(&format!(
        r#"        <div class="time" style="text-align: right; color: #999; padding: 0 15px 15px;">{timestamp}</div>
    </div>
    <div style="background-color: #F5F5F5;direction: ltr;padding: 16px;margin-bottom: 6px;border-bottom-left-radius: 10px;border-bottom-right-radius: 10px;">
        <span style="font-family: Roboto-Regular,Helvetica,Arial,sans-serif; font-size: 13px; line-height: 1.6; color: rgba(0,0,0,0.54);">This message was sent automatically by {site_name}. Please do not reply.</span>
    </div>
</div>
</body>"#,
    ));

    html
}
