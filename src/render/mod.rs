//! Page rendering.
//!
//! One renderer, parameterized by [`RenderOptions`], replaces the pile of
//! near-duplicate generator variants this tool grew from. The engine hands
//! over structured data (annotated transcript items, section indices, the
//! image catalog); this module turns it into markup and embeds the client
//! script that realizes the synchronizer's event→effect table in the
//! browser.

use anyhow::Result;

use crate::bundle::{DocumentBundle, LanguageTrack};
use crate::config::Config;
use crate::section::SectionIndex;
use crate::segment::{self, AnnotatedItem, LineTag};
use crate::sync::Synchronizer;
use crate::utils::{audio_mime_type, html_escape, json_for_script};

/// Render one interview page to a complete HTML document.
pub fn render_page(bundle: &DocumentBundle, config: &Config) -> Result<String> {
    let speakers = config.speaker_names();

    let primary_html = bundle
        .primary
        .as_ref()
        .map(|track| transcript_html(track, &speakers))
        .unwrap_or_default();
    let secondary_html = bundle
        .secondary
        .as_ref()
        .map(|track| transcript_html(track, &speakers))
        .unwrap_or_default();

    let authoritative = bundle.authoritative();
    let sync = Synchronizer::new(
        authoritative.index.clone(),
        bundle.images.clone(),
        config.render.image_mode(),
        bundle.has_both_languages(),
    );

    let initial_image = sync
        .current_image_key()
        .and_then(|key| bundle.images.get(key).map(|info| (key, info)));
    let (initial_src, initial_caption) = match initial_image {
        Some((_, info)) => (info.src.clone(), info.caption.clone()),
        None => (String::new(), String::new()),
    };

    let nav = nav_html(config, &bundle.page.page_id);
    let toc = toc_html(bundle, config);
    let transcript_pane = transcript_pane_html(bundle, &primary_html, &secondary_html);
    let carousel = carousel_html(config);
    let gallery = gallery_html(config);
    let script = sync_script(bundle, config, &sync, &primary_html, &secondary_html)?;
    let speaker_css = speaker_css(config);

    let generated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{page_title}</title>
    <style>
{base_css}
{speaker_css}
    </style>
</head>
<body>
    <!-- generated by interview-weaver, {generated_at} -->
    <div id="site-title"><b>{site_title}:</b> {page_title}</div>
    <div id="nav">{nav}</div>
    <audio id="audioPlayer" controls>
        <source src="{audio_file}" type="{audio_mime}">
        Your browser does not support the audio element.
    </audio>
    <div id="main-container">
        <div id="left-column">
            <div id="image-subtitle">{initial_caption}</div>
            <div id="image-container">
                <img id="current-image" src="{initial_src}" alt="Section image">
            </div>
{carousel}{gallery_link}
{toc}
        </div>
{transcript_pane}
    </div>
{gallery}
{script}
</body>
</html>
"#,
        page_title = html_escape(&bundle.page.page_title),
        site_title = html_escape(&config.site.title),
        base_css = PAGE_CSS,
        speaker_css = speaker_css,
        generated_at = generated_at,
        nav = nav,
        audio_file = html_escape(&bundle.page.audio_file),
        audio_mime = audio_mime_type(&bundle.page.audio_file),
        initial_caption = html_escape(&initial_caption),
        initial_src = html_escape(&initial_src),
        carousel = carousel,
        gallery_link = if config.render.gallery_popup {
            "            <div id=\"gallery-link\"><button onclick=\"openGallery()\">Gallery</button></div>\n"
        } else {
            ""
        },
        toc = toc,
        transcript_pane = transcript_pane,
        gallery = gallery,
        script = script,
    ))
}

/// Turn one language track's annotated view into transcript markup.
///
/// Section boundaries become anchor divs, timestamp lines become seek
/// controls, and recognized speaker names get a styling span. All original
/// text is escaped; the engine's tags are the only markup source.
fn transcript_html(track: &LanguageTrack, speakers: &[String]) -> String {
    let assignment = segment::segment(&track.lines, &track.index);
    let items = segment::annotate(&track.lines, &assignment, &track.index, speakers);

    let mut out = String::new();
    for item in items {
        match item {
            AnnotatedItem::SectionStart { section_id } => {
                out.push_str(&format!(
                    "<div id=\"{}\" class=\"section-anchor\"></div>\n",
                    html_escape(&section_id)
                ));
            }
            AnnotatedItem::Line { text, tag } => {
                match tag {
                    LineTag::SeekControl { seconds } => {
                        out.push_str(&format!(
                            "<a href=\"#\" class=\"timestamp\" onclick=\"jumpToTime({}); return false;\">{}</a>",
                            seconds,
                            html_escape(text.trim())
                        ));
                    }
                    LineTag::Speaker(name) => {
                        let rest = text.strip_prefix(name.as_str()).unwrap_or("");
                        out.push_str(&format!(
                            "<span class=\"speaker-{}\">{}</span>{}",
                            speaker_slug(&name),
                            html_escape(&name),
                            html_escape(rest)
                        ));
                    }
                    LineTag::Plain => out.push_str(&html_escape(&text)),
                }
                out.push('\n');
            }
        }
    }
    out
}

fn speaker_slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

fn speaker_css(config: &Config) -> String {
    let mut css = String::new();
    for speaker in &config.speakers {
        css.push_str(&format!(
            ".speaker-{} {{ color: {}; font-weight: bold; }}\n",
            speaker_slug(&speaker.name),
            speaker.color
        ));
    }
    css
}

fn nav_html(config: &Config, current_page_id: &str) -> String {
    config
        .pages
        .iter()
        .map(|page| {
            let class = if page.page_id == current_page_id {
                "nav-link selected"
            } else {
                "nav-link"
            };
            format!(
                "<a href=\"{}\" class=\"{}\">{}</a>",
                html_escape(&page.output_file.to_string_lossy()),
                class,
                html_escape(&page.page_title)
            )
        })
        .collect()
}

fn toc_entries(index: &SectionIndex, suffix: &str) -> String {
    index
        .sections()
        .iter()
        .map(|section| {
            format!(
                "                    <li><a href=\"#{id}\" id=\"link-{id}-{suffix}\" onclick=\"jumpToSection('{id}', {start}); return false;\">{title} ({time})</a></li>\n",
                id = html_escape(&section.id),
                suffix = suffix,
                start = section.start_time,
                title = html_escape(&section.title),
                time = html_escape(&section.display_time),
            )
        })
        .collect()
}

fn toc_html(bundle: &DocumentBundle, config: &Config) -> String {
    if let (true, Some(primary), Some(secondary)) = (
        config.render.dual_language_toc,
        bundle.primary.as_ref(),
        bundle.secondary.as_ref(),
    ) {
        format!(
            r#"            <div id="toc-title">
                <button onclick="showToc('primary')">{primary_label}</button>
                <span id="toc-heading"><b>Sections</b></span>
                <button onclick="showToc('secondary')">{secondary_label}</button>
            </div>
            <div id="toc-primary" class="toc-container">
                <ul>
{primary_entries}                </ul>
            </div>
            <div id="toc-secondary" class="toc-container" style="display:none;">
                <ul>
{secondary_entries}                </ul>
            </div>
"#,
            primary_label = html_escape(&config.site.primary_label),
            secondary_label = html_escape(&config.site.secondary_label),
            primary_entries = toc_entries(&primary.index, "primary"),
            secondary_entries = toc_entries(&secondary.index, "secondary"),
        )
    } else {
        format!(
            r#"            <div id="toc-title"><span id="toc-heading"><b>Sections</b></span></div>
            <div id="toc-primary" class="toc-container">
                <ul>
{entries}                </ul>
            </div>
"#,
            entries = toc_entries(&bundle.authoritative().index, "primary"),
        )
    }
}

fn transcript_pane_html(bundle: &DocumentBundle, primary_html: &str, secondary_html: &str) -> String {
    // The language toggle is omitted entirely, not disabled, when a
    // document exists in only one language.
    let toggle = if bundle.has_both_languages() {
        r#"            <div id="transcript-toggle">
                <button onclick="showTranscript('primary')">Primary</button>
                <button onclick="showTranscript('secondary')">Secondary</button>
            </div>
"#
        .to_string()
    } else {
        String::new()
    };

    let visible = if !primary_html.is_empty() {
        primary_html
    } else {
        secondary_html
    };

    format!(
        r#"        <div id="right-column">
{toggle}            <div id="transcript-content">
                <pre id="transcript-pre">
{visible}                </pre>
            </div>
        </div>
"#,
    )
}

fn carousel_html(config: &Config) -> String {
    if !config.render.show_image_carousel {
        return String::new();
    }
    concat!(
        "            <div id=\"image-buttons\">\n",
        "                <button onclick=\"prevImage()\">&#9664;</button>\n",
        "                <button onclick=\"nextImage()\">&#9654;</button>\n",
        "            </div>\n"
    )
    .to_string()
}

fn gallery_html(config: &Config) -> String {
    if !config.render.gallery_popup {
        return String::new();
    }
    concat!(
        "    <div id=\"gallery-popup\">\n",
        "        <span id=\"gallery-close\" onclick=\"closeGallery()\">&times;</span>\n",
        "        <div id=\"gallery-content\">\n",
        "            <div id=\"gallery-full-pane\">\n",
        "                <img id=\"gallery-full\" src=\"\" alt=\"Full image\">\n",
        "                <div id=\"gallery-full-title\"></div>\n",
        "                <div id=\"gallery-full-subtitle\"></div>\n",
        "            </div>\n",
        "            <div id=\"gallery-thumbs-pane\"></div>\n",
        "        </div>\n",
        "    </div>\n"
    )
    .to_string()
}

/// Embed the client-side realization of the synchronizer contract.
///
/// The script mirrors `crate::sync` transition for transition; the Rust
/// state machine is the source of truth, this is its DOM rendering.
fn sync_script(
    bundle: &DocumentBundle,
    config: &Config,
    sync: &Synchronizer,
    primary_html: &str,
    secondary_html: &str,
) -> Result<String> {
    let authoritative = bundle.authoritative();

    let script = SYNC_SCRIPT
        .replace(
            "__SECTIONS__",
            &json_for_script(&authoritative.index.sections())?,
        )
        .replace("__IMAGES__", &json_for_script(&bundle.images)?)
        .replace("__T_PRIMARY__", &json_for_script(&primary_html)?)
        .replace("__T_SECONDARY__", &json_for_script(&secondary_html)?)
        .replace(
            "__IMAGE_MODE__",
            match config.render.image_mode() {
                crate::sync::ImageMode::Linked => "linked",
                crate::sync::ImageMode::Carousel => "carousel",
            },
        )
        .replace(
            "__INITIAL_SECTION__",
            &json_for_script(&sync.current_section_id())?,
        )
        .replace(
            "__INITIAL_IMAGE__",
            &json_for_script(&sync.current_image_key())?,
        )
        .replace(
            "__DUAL_TOC__",
            if config.render.dual_language_toc && bundle.has_both_languages() {
                "true"
            } else {
                "false"
            },
        );

    Ok(format!("    <script>\n{}\n    </script>", script))
}

const PAGE_CSS: &str = r#"body { font-family: 'Roboto', sans-serif; margin: 20px; background-color: #f0f2f5; color: #333; }
#site-title { font-size: 12pt; text-decoration: underline; margin-bottom: 4px; }
#nav { display: flex; justify-content: center; margin-bottom: 5px; border-bottom: 1px solid #e0e0e0; }
.nav-link { flex: 1; padding: 5px; text-align: center; font-size: 0.85em; text-decoration: none; color: #555; background-color: #fff; border-right: 1px solid #e0e0e0; }
.nav-link:last-child { border-right: none; }
.nav-link:hover { background-color: #e9eff5; color: #222; }
.nav-link.selected { background-color: #007acc; color: #fff; pointer-events: none; }
audio { width: 100%; margin-bottom: 10px; max-height: 20px; }
#main-container { display: flex; gap: 12px; height: calc(90vh - 130px); }
#left-column { width: 50%; display: flex; flex-direction: column; height: 100%; background-color: #fff; border-radius: 4px; overflow: hidden; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
#image-buttons { text-align: center; margin: 2px 0; }
#image-buttons button { background: none; border: none; cursor: pointer; font-size: 1.2em; color: #007acc; padding: 2px 5px; }
#image-subtitle { margin-top: 10px; font-size: 0.7em; color: #555; text-align: center; }
#image-container { height: 55%; position: relative; overflow: hidden; display: flex; justify-content: center; align-items: center; }
#image-container img { max-height: 100%; max-width: 100%; object-fit: contain; }
#gallery-link { text-align: center; margin: 5px; }
#toc-title { font-size: 0.8em; text-align: center; border-top: 1px solid #e0e0e0; padding: 2px; }
#toc-title button { margin: 0 5px; padding: 4px 10px; background-color: #007acc; color: #fff; border: none; border-radius: 4px; cursor: pointer; }
.toc-container { height: 34%; overflow-y: auto; background-color: #fafafa; border-top: 1px solid #e0e0e0; padding: 10px; }
.toc-container ul { list-style: none; padding: 0; margin: 0; }
.toc-container li { margin-bottom: 8px; }
.toc-container a { text-decoration: none; color: gray; }
#right-column { width: 50%; background-color: #fff; border-radius: 4px; box-shadow: 0 2px 8px rgba(0,0,0,0.08); overflow-y: auto; padding: 15px; }
#transcript-toggle { text-align: center; margin-bottom: 10px; }
#transcript-toggle button { margin: 0 5px; padding: 8px 15px; background-color: #007acc; color: #fff; border: none; border-radius: 4px; cursor: pointer; }
#transcript-content pre { white-space: pre-wrap; font-size: 1em; line-height: 1.6; }
.section-anchor { padding-top: 60px; margin-top: -60px; }
.timestamp { font-weight: bold; color: #333; cursor: pointer; }
.timestamp:hover { color: #007acc; }
#gallery-popup { display: none; position: fixed; top: 10%; left: 10%; width: 80%; height: 80%; background-color: #fff; border: 2px solid #007acc; box-shadow: 0 4px 16px rgba(0,0,0,0.2); z-index: 1000; padding: 10px; overflow: hidden; }
#gallery-close { position: absolute; top: 5px; right: 10px; font-size: 1.5em; cursor: pointer; color: #007acc; }
#gallery-content { display: flex; height: 100%; }
#gallery-full-pane { flex: 2; display: flex; flex-direction: column; align-items: center; justify-content: center; border-right: 1px solid #e0e0e0; padding: 10px; }
#gallery-full-pane img { max-width: 100%; max-height: 70%; object-fit: contain; }
#gallery-thumbs-pane { flex: 1; overflow-y: auto; padding: 5px; }
#gallery-thumbs-pane img { width: 80px; height: 60px; object-fit: cover; margin: 3px 0; cursor: pointer; border: 2px solid transparent; }
#gallery-thumbs-pane img.selected { border: 2px solid #007acc; }"#;

// Client-side realization of the synchronizer. Transition order matches the
// state machine in src/sync: audio seek, then scroll, then state update,
// then TOC highlight, then image refresh. Scroll observation never touches
// the audio position.
const SYNC_SCRIPT: &str = r#"        var sections = __SECTIONS__;
        var sectionImages = __IMAGES__;
        var transcripts = { primary: __T_PRIMARY__, secondary: __T_SECONDARY__ };
        var imageMode = "__IMAGE_MODE__";
        var dualToc = __DUAL_TOC__;
        var currentSectionId = __INITIAL_SECTION__;
        var currentImageKey = __INITIAL_IMAGE__;
        var currentToc = "primary";
        var imageBearing = sections.filter(function(pt) { return pt.image; });
        var carouselPos = 0;
        var suppressScroll = false;

        function positionOf(sectionId) {
            for (var i = 0; i < sections.length; i++) {
                if (sections[i].id === sectionId) { return i; }
            }
            return -1;
        }

        function effectiveImageKey(pos) {
            for (var i = pos; i >= 0; i--) {
                if (sections[i].image) { return sections[i].image; }
            }
            return null;
        }

        function showImage(key) {
            if (!key || key === currentImageKey) { return; }
            var info = sectionImages[key];
            if (!info) { return; }  /* stale key: keep the previous image */
            currentImageKey = key;
            document.getElementById("current-image").src = info.src;
            document.getElementById("image-subtitle").textContent = info.caption;
        }

        function refreshImage() {
            if (imageMode !== "linked") { return; }
            showImage(effectiveImageKey(positionOf(currentSectionId)));
        }

        function updateToc() {
            var container = document.getElementById("toc-" + currentToc);
            if (!container) { return; }
            sections.forEach(function(pt) {
                var entry = document.getElementById("link-" + pt.id + "-" + currentToc);
                if (!entry) { return; }
                if (pt.id === currentSectionId) {
                    entry.style.color = "black";
                    var containerRect = container.getBoundingClientRect();
                    var entryRect = entry.getBoundingClientRect();
                    if (entryRect.top < containerRect.top || entryRect.bottom > containerRect.bottom) {
                        entry.scrollIntoView({ behavior: "smooth", block: "nearest" });
                    }
                } else {
                    entry.style.color = "gray";
                }
            });
        }

        function jumpToTime(seconds) {
            var audio = document.getElementById("audioPlayer");
            audio.currentTime = seconds;
            audio.play();
        }

        function jumpToSection(sectionId, seconds) {
            if (positionOf(sectionId) < 0) { return; }
            jumpToTime(seconds);
            var anchor = document.getElementById(sectionId);
            if (anchor) {
                suppressScroll = true;
                anchor.scrollIntoView({ behavior: "smooth", block: "start" });
                setTimeout(function() { suppressScroll = false; }, 600);
            }
            currentSectionId = sectionId;
            updateToc();
            refreshImage();
        }

        function stepLinked(direction) {
            var pos = positionOf(currentSectionId);
            var target = null;
            if (direction > 0) {
                for (var i = 0; i < imageBearing.length; i++) {
                    if (positionOf(imageBearing[i].id) > pos) { target = imageBearing[i]; break; }
                }
            } else {
                for (var j = imageBearing.length - 1; j >= 0; j--) {
                    if (positionOf(imageBearing[j].id) < pos) { target = imageBearing[j]; break; }
                }
            }
            if (!target) { return; }  /* clamped at either end */
            currentSectionId = target.id;
            updateToc();
            refreshImage();
        }

        function stepCarousel(direction) {
            if (imageBearing.length === 0) { return; }
            var next = Math.min(Math.max(carouselPos + direction, 0), imageBearing.length - 1);
            if (next === carouselPos) { return; }
            carouselPos = next;
            showImage(imageBearing[carouselPos].image);
        }

        function prevImage() {
            if (imageBearing.length === 0) { return; }
            if (imageMode === "linked") { stepLinked(-1); } else { stepCarousel(-1); }
        }

        function nextImage() {
            if (imageBearing.length === 0) { return; }
            if (imageMode === "linked") { stepLinked(1); } else { stepCarousel(1); }
        }

        function showTranscript(lang) {
            if (!transcripts[lang]) { return; }
            document.getElementById("transcript-pre").innerHTML = transcripts[lang];
        }

        function showToc(lang) {
            if (!dualToc) { return; }
            var other = lang === "primary" ? "secondary" : "primary";
            var shown = document.getElementById("toc-" + lang);
            var hidden = document.getElementById("toc-" + other);
            if (!shown || !hidden) { return; }
            shown.style.display = "block";
            hidden.style.display = "none";
            currentToc = lang;
            updateToc();
        }

        /* Scroll observation: closest boundary marker to the pane top wins.
           Coalesced with a short timer; never seeks the audio. */
        var scrollDiv = document.getElementById("right-column");
        var scrollTimer = null;
        if (scrollDiv) {
            scrollDiv.addEventListener("scroll", function() {
                if (suppressScroll) { return; }
                if (scrollTimer) { clearTimeout(scrollTimer); }
                scrollTimer = setTimeout(function() {
                    var containerRect = scrollDiv.getBoundingClientRect();
                    var closestId = null;
                    var minDiff = Infinity;
                    sections.forEach(function(pt) {
                        var anchor = document.getElementById(pt.id);
                        if (!anchor) { return; }
                        var diff = Math.abs(anchor.getBoundingClientRect().top - containerRect.top);
                        if (diff < minDiff) { minDiff = diff; closestId = pt.id; }
                    });
                    if (closestId && closestId !== currentSectionId) {
                        currentSectionId = closestId;
                        updateToc();
                        refreshImage();
                    }
                }, 100);
            });
        }

        function updateGalleryImage(key) {
            var info = sectionImages[key];
            if (!info) { return; }
            document.getElementById("gallery-full").src = info.src;
            document.getElementById("gallery-full-title").textContent = info.caption.split(".")[0];
            document.getElementById("gallery-full-subtitle").textContent = info.caption;
        }

        function populateGalleryThumbnails() {
            var thumbsPane = document.getElementById("gallery-thumbs-pane");
            thumbsPane.innerHTML = "";
            Object.keys(sectionImages).forEach(function(key) {
                var thumb = document.createElement("img");
                thumb.src = sectionImages[key].src;
                thumb.onclick = function() {
                    updateGalleryImage(key);
                    var allThumbs = thumbsPane.getElementsByTagName("img");
                    for (var i = 0; i < allThumbs.length; i++) {
                        allThumbs[i].classList.remove("selected");
                    }
                    thumb.classList.add("selected");
                };
                if (key === currentImageKey) { thumb.classList.add("selected"); }
                thumbsPane.appendChild(thumb);
            });
        }

        function openGallery() {
            var popup = document.getElementById("gallery-popup");
            if (!popup) { return; }
            popup.style.display = "block";
            if (currentImageKey) { updateGalleryImage(currentImageKey); }
            populateGalleryThumbnails();
        }

        function closeGallery() {
            var popup = document.getElementById("gallery-popup");
            if (popup) { popup.style.display = "none"; }
        }

        updateToc();"#;
