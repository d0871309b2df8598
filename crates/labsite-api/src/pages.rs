//! Minimal HTML rendering for public pages and the admin area.

use labsite_core::{
    AdminIdentity, FORUMS, Forum, ListResult, Locale, Publication, routing::ADMIN_HOME,
};
use std::fmt::Write;

/// Localized UI strings
pub struct Strings {
    pub site_title: &'static str,
    pub home: &'static str,
    pub achievements: &'static str,
    pub forum: &'static str,
    pub papers: &'static str,
    pub no_papers: &'static str,
    pub previous: &'static str,
    pub next: &'static str,
    pub not_found: &'static str,
    pub forum_host: &'static str,
    pub forum_speaker: &'static str,
    pub forum_date: &'static str,
    pub forum_view_details: &'static str,
    pub forum_introduction: &'static str,
    pub forum_back_to_list: &'static str,
}

pub fn strings(locale: Locale) -> &'static Strings {
    match locale {
        Locale::En => &Strings {
            site_title: "Academic Profile",
            home: "Home",
            achievements: "Achievements",
            forum: "Forum",
            papers: "Papers",
            no_papers: "No papers yet.",
            previous: "Previous",
            next: "Next",
            not_found: "Page not found",
            forum_host: "Host",
            forum_speaker: "Speaker",
            forum_date: "Date",
            forum_view_details: "View Details",
            forum_introduction: "Introduction",
            forum_back_to_list: "Back to Forum List",
        },
        Locale::Zh => &Strings {
            site_title: "学术主页",
            home: "首页",
            achievements: "学术成果",
            forum: "论坛",
            papers: "论文",
            no_papers: "暂无论文。",
            previous: "上一页",
            next: "下一页",
            not_found: "页面不存在",
            forum_host: "主持人",
            forum_speaker: "主讲人",
            forum_date: "举办时间",
            forum_view_details: "查看详情",
            forum_introduction: "论坛介绍",
            forum_back_to_list: "返回论坛列表",
        },
        Locale::Ja => &Strings {
            site_title: "研究者プロフィール",
            home: "ホーム",
            achievements: "業績",
            forum: "フォーラム",
            papers: "論文",
            no_papers: "論文はまだありません。",
            previous: "前へ",
            next: "次へ",
            not_found: "ページが見つかりません",
            forum_host: "司会者",
            forum_speaker: "講演者",
            forum_date: "開催日",
            forum_view_details: "詳細を見る",
            forum_introduction: "紹介",
            forum_back_to_list: "フォーラムリストに戻る",
        },
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn document(lang: &str, title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        lang,
        escape(title),
        body
    )
}

/// A public page with navigation and a language switcher.
///
/// `rest` is the path after the locale prefix, used to link the same page
/// in the other languages.
pub fn public_page(locale: Locale, rest: &str, heading: &str, content: &str) -> String {
    let s = strings(locale);
    let mut nav = String::from("<nav>");
    for (href, label) in [
        (String::new(), s.home),
        ("/achievements".to_string(), s.achievements),
        ("/forum".to_string(), s.forum),
        ("/papers".to_string(), s.papers),
    ] {
        let _ = write!(nav, "<a href=\"/{}{}\">{}</a> ", locale, href, label);
    }
    nav.push_str("<span class=\"language-switcher\">");
    for other in Locale::ALL {
        if other == locale {
            let _ = write!(nav, "<strong>{}</strong> ", other.label());
        } else {
            let _ = write!(
                nav,
                "<a href=\"/{}{}\" hreflang=\"{}\">{}</a> ",
                other,
                escape(rest),
                other,
                other.label()
            );
        }
    }
    nav.push_str("</span></nav>");

    let title = format!("{} | {}", heading, s.site_title);
    let body = format!(
        "{}\n<main>\n<h1>{}</h1>\n{}\n</main>",
        nav,
        escape(heading),
        content
    );
    document(locale.as_str(), &title, &body)
}

/// Only absolute http(s) links are rendered as anchors.
fn is_web_link(link: &str) -> bool {
    let scheme = link.trim_start().split_once(':').map(|(scheme, _)| scheme);
    scheme.is_some_and(|s| s.eq_ignore_ascii_case("http") || s.eq_ignore_ascii_case("https"))
}

fn publication_item(p: &Publication) -> String {
    let title = match p.link.as_deref().filter(|link| is_web_link(link)) {
        Some(link) => format!("<a href=\"{}\">{}</a>", escape(link), escape(&p.title)),
        None => escape(&p.title),
    };
    format!(
        "<li class=\"publication\" data-id=\"{}\">{}<br><span class=\"authors\">{}</span> \
         <em>{}</em> ({})</li>",
        p.id,
        title,
        escape(&p.authors.joined()),
        escape(&p.journal),
        p.year
    )
}

fn pagination(base: &str, result: &ListResult<Publication>, previous: &str, next: &str) -> String {
    let page = result.page();
    let pages = result.total_pages();
    if pages <= 1 {
        return String::new();
    }

    let mut out = String::from("<nav class=\"pagination\">");
    if page > 1 {
        let _ = write!(out, "<a href=\"{}?page={}\">{}</a> ", base, page - 1, previous);
    }
    let _ = write!(out, "<span>{} / {}</span>", page, pages);
    if page < pages {
        let _ = write!(out, " <a href=\"{}?page={}\">{}</a>", base, page + 1, next);
    }
    out.push_str("</nav>");
    out
}

/// Body of the public papers page.
pub fn papers_list(locale: Locale, result: &ListResult<Publication>) -> String {
    let s = strings(locale);
    if result.items.is_empty() {
        return format!("<p>{}</p>", s.no_papers);
    }

    let items: String = result.items.iter().map(publication_item).collect();
    format!(
        "<ol class=\"publications\">{}</ol>\n{}",
        items,
        pagination(&format!("/{}/papers", locale), result, s.previous, s.next)
    )
}

// === Forum ===

/// Body of the forum list page: one card per session.
pub fn forum_list(locale: Locale) -> String {
    let s = strings(locale);
    let mut out = String::from("<ul class=\"forums\">");
    for forum in &FORUMS {
        let _ = write!(
            out,
            "<li class=\"forum\"><img src=\"{image}\" alt=\"\"><h2>{title}</h2>\
             <p>{date_label}: {date}</p><p>{host_label}: {host}</p>\
             <a href=\"/{locale}/forum/{id}\">{view}</a></li>",
            image = escape(forum.image),
            title = escape(forum.title),
            date_label = s.forum_date,
            date = escape(forum.date),
            host_label = s.forum_host,
            host = escape(forum.host),
            locale = locale,
            id = escape(forum.id),
            view = s.forum_view_details,
        );
    }
    out.push_str("</ul>");
    out
}

/// Body of a forum detail page, with the recording embedded.
pub fn forum_detail(locale: Locale, forum: &Forum) -> String {
    let s = strings(locale);
    let speakers: Vec<String> = forum.speakers().map(escape).collect();
    format!(
        "<a href=\"/{locale}/forum\" class=\"back\">{back}</a>\n\
         <div class=\"player\"><iframe src=\"{player}\" title=\"{title}\" allowfullscreen></iframe></div>\n\
         <dl class=\"forum-meta\"><dt>{date_label}</dt><dd>{date}</dd>\
         <dt>{host_label}</dt><dd>{host}</dd>\
         <dt>{speaker_label}</dt><dd>{speakers}</dd></dl>\n\
         <h2>{intro}</h2>\n<p>{description}</p>",
        locale = locale,
        back = s.forum_back_to_list,
        player = escape(&forum.player_url()),
        title = escape(forum.title),
        date_label = s.forum_date,
        date = escape(forum.date),
        host_label = s.forum_host,
        host = escape(forum.host),
        speaker_label = s.forum_speaker,
        speakers = speakers.join(", "),
        intro = s.forum_introduction,
        description = escape(forum.description),
    )
}

// === Admin area ===

/// Bare login page, rendered without the admin chrome.
pub fn admin_login() -> String {
    let body = r#"<main class="login">
<h1>管理员登录</h1>
<form id="login-form">
<label>用户名 <input name="username" autocomplete="username" required></label>
<label>密码 <input name="password" type="password" autocomplete="current-password" required></label>
<button type="submit">登录</button>
<p id="login-error" role="alert"></p>
</form>
<script>
document.getElementById("login-form").addEventListener("submit", async (e) => {
  e.preventDefault();
  const form = new FormData(e.target);
  const res = await fetch("/api/admin/auth/login", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ username: form.get("username"), password: form.get("password") }),
  });
  if (res.ok) { window.location.href = "/admin/papers"; return; }
  const data = await res.json().catch(() => ({}));
  document.getElementById("login-error").textContent = data.error || "登录失败";
});
</script>
</main>"#;
    document("zh", "管理员登录", body)
}

/// Content of the admin papers page; the guard adds the chrome.
///
/// The form creates a publication, or replaces one after its edit button
/// loads the row's values into it.
pub fn admin_papers(result: &ListResult<Publication>) -> String {
    let mut rows = String::new();
    for p in &result.items {
        let _ = write!(
            rows,
            "<tr data-id=\"{id}\"><td>{title}</td><td>{authors}</td><td>{journal}</td>\
             <td>{year}</td><td><button data-edit=\"{id}\" data-title=\"{title}\" \
             data-authors=\"{authors}\" data-journal=\"{journal}\" data-year=\"{year}\" \
             data-link=\"{link}\">编辑</button> <button data-delete=\"{id}\">删除</button></td></tr>",
            id = p.id,
            title = escape(&p.title),
            authors = escape(&p.authors.joined()),
            journal = escape(&p.journal),
            year = p.year,
            link = escape(p.link.as_deref().unwrap_or("")),
        );
    }
    if rows.is_empty() {
        rows.push_str("<tr><td colspan=\"5\">No papers found</td></tr>");
    }

    let content = format!(
        r#"<h1>论文管理</h1>
<p>共 {total} 篇</p>
<table class="papers">
<thead><tr><th>标题</th><th>作者</th><th>期刊</th><th>年份</th><th></th></tr></thead>
<tbody>{rows}</tbody>
</table>
{pagination}
<h2 id="form-heading">添加论文</h2>
<form id="paper-form">
<input name="title" placeholder="标题" required>
<input name="authors" placeholder="作者（逗号分隔）" required>
<input name="journal" placeholder="期刊" required>
<input name="year" type="number" placeholder="年份" required>
<input name="link" placeholder="链接">
<button type="submit" id="form-submit">保存</button>
<button type="button" id="form-cancel" hidden>取消</button>
</form>
<script>
const paperForm = document.getElementById("paper-form");
const resetForm = () => {{
  paperForm.reset();
  delete paperForm.dataset.editing;
  document.getElementById("form-heading").textContent = "添加论文";
  document.getElementById("form-submit").textContent = "保存";
  document.getElementById("form-cancel").hidden = true;
}};
paperForm.addEventListener("submit", async (e) => {{
  e.preventDefault();
  const form = Object.fromEntries(new FormData(paperForm));
  const id = paperForm.dataset.editing;
  const res = await fetch(id ? "/api/admin/papers/" + id : "/api/admin/papers", {{
    method: id ? "PUT" : "POST",
    headers: {{ "Content-Type": "application/json" }},
    body: JSON.stringify(form),
  }});
  if (res.ok) window.location.reload();
}});
document.getElementById("form-cancel").addEventListener("click", resetForm);
document.querySelectorAll("[data-edit]").forEach((btn) => btn.addEventListener("click", () => {{
  for (const field of ["title", "authors", "journal", "year", "link"]) {{
    paperForm.elements[field].value = btn.dataset[field];
  }}
  paperForm.dataset.editing = btn.dataset.edit;
  document.getElementById("form-heading").textContent = "编辑论文";
  document.getElementById("form-submit").textContent = "更新";
  document.getElementById("form-cancel").hidden = false;
  paperForm.scrollIntoView();
}}));
document.querySelectorAll("[data-delete]").forEach((btn) => btn.addEventListener("click", async () => {{
  if (!confirm("确定删除这篇论文吗？")) return;
  const res = await fetch("/api/admin/papers/" + btn.dataset.delete, {{ method: "DELETE" }});
  if (res.ok) window.location.reload();
}}));
</script>"#,
        total = result.total,
        rows = rows,
        pagination = pagination(ADMIN_HOME, result, "上一页", "下一页"),
    );
    document("zh", "论文管理", &content)
}

/// Wrap an admin page's `<body>` content in the navigation chrome.
///
/// `page` is a full document produced by this module; its body is extracted
/// and placed in the main column.
pub fn admin_chrome(admin: &AdminIdentity, pathname: &str, page: &str) -> String {
    let inner = page
        .split_once("<body>")
        .and_then(|(_, rest)| rest.rsplit_once("</body>"))
        .map(|(body, _)| body)
        .unwrap_or(page);
    let title = page
        .split_once("<title>")
        .and_then(|(_, rest)| rest.split_once("</title>"))
        .map(|(t, _)| t)
        .unwrap_or("管理面板");

    let papers_active = if pathname.starts_with(ADMIN_HOME) {
        " class=\"active\" aria-current=\"page\""
    } else {
        ""
    };

    let body = format!(
        r#"<div class="admin-layout">
<aside>
<h1>管理面板</h1>
<p class="welcome">欢迎，{username}</p>
<nav>
<a href="{papers}"{active}>论文管理</a>
<span class="disabled" title="即将上线">论坛（即将上线）</span>
</nav>
<form method="post" action="/api/admin/auth/logout" id="logout-form"><button type="submit">退出登录</button></form>
<a href="/" data-testid="back-to-frontend">返回前台</a>
</aside>
<main id="admin-content">{inner}</main>
</div>
<script>
document.getElementById("logout-form").addEventListener("submit", async (e) => {{
  e.preventDefault();
  await fetch("/api/admin/auth/logout", {{ method: "POST" }});
  window.location.href = "/admin/login";
}});
</script>"#,
        username = escape(&admin.username),
        papers = ADMIN_HOME,
        active = papers_active,
        inner = inner,
    );

    // `title` is already escaped by `document`.
    format!(
        "<!DOCTYPE html>\n<html lang=\"zh\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        title, body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use labsite_core::Authors;

    fn publication(id: i64, title: &str) -> Publication {
        Publication {
            id,
            title: title.to_string(),
            authors: Authors::new(["Da Bo", "Co Author"]),
            journal: "PRB".to_string(),
            year: 2024,
            link: Some("https://example.com/a?b=1&c=2".to_string()),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_public_page_language_switcher() {
        let html = public_page(Locale::Zh, "/papers", "论文", "");
        assert!(html.contains("<html lang=\"zh\">"));
        assert!(html.contains("href=\"/en/papers\""));
        assert!(html.contains("href=\"/ja/papers\""));
        assert!(html.contains("<strong>中文</strong>"));
    }

    #[test]
    fn test_papers_list_escapes_and_links() {
        let result = ListResult {
            items: vec![publication(1, "<b>Bold</b>")],
            total: 1,
            limit: 10,
            offset: 0,
        };
        let html = papers_list(Locale::En, &result);
        assert!(html.contains("&lt;b&gt;Bold&lt;/b&gt;"));
        assert!(html.contains("https://example.com/a?b=1&amp;c=2"));
        assert!(html.contains("Da Bo, Co Author"));
        assert!(!html.contains("pagination"));
    }

    #[test]
    fn test_papers_list_pagination_links() {
        let result = ListResult {
            items: vec![publication(1, "A")],
            total: 25,
            limit: 10,
            offset: 10,
        };
        let html = papers_list(Locale::Ja, &result);
        assert!(html.contains("/ja/papers?page=1"));
        assert!(html.contains("/ja/papers?page=3"));
        assert!(html.contains("2 / 3"));
    }

    #[test]
    fn test_empty_papers_list_is_localized() {
        let result: ListResult<Publication> = ListResult {
            items: vec![],
            total: 0,
            limit: 10,
            offset: 0,
        };
        assert!(papers_list(Locale::Zh, &result).contains("暂无论文"));
    }

    #[test]
    fn test_non_web_links_are_not_clickable() {
        let mut p = publication(1, "Sneaky");
        for link in ["javascript:alert(1)", " JavaScript:alert(1)", "data:text/html,x", "//evil.example"] {
            p.link = Some(link.to_string());
            let html = publication_item(&p);
            assert!(!html.contains("<a "), "{}", link);
            assert!(html.contains("Sneaky"));
        }

        p.link = Some("HTTP://example.com/paper".to_string());
        assert!(publication_item(&p).contains("<a href=\"HTTP://example.com/paper\">"));
    }

    #[test]
    fn test_forum_list_links_to_details() {
        let html = forum_list(Locale::Zh);
        assert!(html.contains("href=\"/zh/forum/forum-1\""));
        assert!(html.contains("href=\"/zh/forum/forum-6\""));
        assert!(html.contains("查看详情"));
    }

    #[test]
    fn test_forum_detail_renders_session() {
        let forum = labsite_core::find_forum("forum-2").unwrap();
        let html = forum_detail(Locale::Ja, forum);
        assert!(html.contains("href=\"/ja/forum\""));
        assert!(html.contains("フォーラムリストに戻る"));
        assert!(html.contains("Prof. Chen Wei"));
        assert!(html.contains("Dr. Bo Da, Dr. Sarah Johnson"));
        assert!(html.contains("bvid=BV1yy4y1e7VN&amp;page=1"));
    }

    #[test]
    fn test_admin_papers_edit_buttons_carry_row_values() {
        let mut p = publication(9, "Edit \"me\"");
        p.link = None;
        let html = admin_papers(&ListResult {
            items: vec![p],
            total: 1,
            limit: 10,
            offset: 0,
        });
        assert!(html.contains("data-edit=\"9\""));
        assert!(html.contains("data-title=\"Edit &quot;me&quot;\""));
        assert!(html.contains("data-authors=\"Da Bo, Co Author\""));
        assert!(html.contains("data-year=\"2024\""));
        assert!(html.contains("data-link=\"\""));
        assert!(html.contains("method: id ? \"PUT\" : \"POST\""));
    }

    #[test]
    fn test_admin_chrome_wraps_body() {
        let admin = AdminIdentity {
            id: 1,
            username: "admin".to_string(),
        };
        let page = admin_papers(&ListResult {
            items: vec![publication(5, "Paper")],
            total: 1,
            limit: 10,
            offset: 0,
        });
        let html = admin_chrome(&admin, "/admin/papers", &page);

        assert!(html.contains("欢迎，admin"));
        assert!(html.contains("<main id=\"admin-content\">"));
        assert!(html.contains("data-id=\"5\""));
        assert!(html.contains("aria-current=\"page\""));
        assert_eq!(html.matches("<body>").count(), 1);
    }
}
