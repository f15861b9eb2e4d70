//! Localized message templates.
//!
//! Every outward-facing string comes from here. A message id is a [`Text`]
//! variant whose fields are its placeholders, so a template can only be
//! rendered with every placeholder supplied; substitution is checked by the
//! compiler, not at runtime.
//!
//! Output is Telegram HTML unless the variant says otherwise. Placeholder
//! values that come from users or upstreams are escaped here.

use crate::{
    domain::{JuzNumber, Language, SurahNumber, UserId},
    formatting::escape_html as esc,
};

#[derive(Clone, Copy, Debug)]
pub enum Text<'a> {
    Welcome,
    LanguagePrompt,
    LanguageSelected,
    ForceJoin,
    /// Plain label for the join button.
    JoinButton,
    SupportUsage,
    SupportSent,
    SupportNotice {
        name: &'a str,
        user_id: UserId,
        message: &'a str,
    },
    SurahUsage,
    JuzUsage,
    ReciterUsage {
        command: &'a str,
        reciter: &'a str,
    },
    /// Plain text; sent together with the verses without a parse mode.
    SurahHeader {
        number: SurahNumber,
        name: &'a str,
    },
    /// Plain text; sent together with the verses without a parse mode.
    JuzHeader {
        number: JuzNumber,
    },
    AudioLink {
        url: &'a str,
        reciter: &'a str,
        surah: SurahNumber,
    },
    AudioNotFound {
        url: &'a str,
    },
    FetchFailed,
    PreferenceNotSaved,
    BroadcastUsage,
    BroadcastStarted {
        total: usize,
    },
    BroadcastReport {
        sent: usize,
        failed: usize,
        total: usize,
    },
    RegistryUnavailable,
    Status(StatusView<'a>),
    AdminAlert {
        detail: &'a str,
    },
}

/// Pre-formatted figures for the admin status report.
#[derive(Clone, Copy, Debug)]
pub struct StatusView<'a> {
    pub version: &'a str,
    pub uptime: &'a str,
    /// `None` when the registry could not be read.
    pub users: Option<usize>,
    pub breakdown: &'a str,
    pub channel: Option<&'a str>,
}

pub fn render(lang: Language, text: &Text<'_>) -> String {
    match lang {
        Language::Am => am(text),
        Language::En => en(text),
        Language::Ar => ar(text),
        Language::Tr => tr(text),
    }
}

fn am(text: &Text<'_>) -> String {
    match *text {
        Text::Welcome => "Assalamu 'alaikum,\n\nወደ ቁርአን ቦት በደህና መጡ!\n\n\
            📖 <b>ለጽሁፍ:</b>\n<code>/surah &lt;ቁጥር&gt;</code>\n<code>/juz &lt;ቁጥር&gt;</code>\n\n\
            🔊 <b>ለድምጽ (ሙሉ ሱራ ሊንክ):</b>\n<code>/abdulbasit &lt;ቁጥር&gt;</code>\n<code>/yasser &lt;ቁጥር&gt;</code>\n\n\
            ⚙️ <b>ሌሎች ትዕዛዞች:</b>\n<code>/language</code> - ቋንቋ ለመቀየር\n<code>/support</code> - ለእርዳታ"
            .to_string(),
        Text::LanguagePrompt => "እባክዎ ቋንቋ ይምረጡ:".to_string(),
        Text::LanguageSelected => "✅ ቋንቋ ወደ አማርኛ ተቀይሯል።".to_string(),
        Text::ForceJoin => "🙏 ቦቱን ለመጠቀም እባክዎ መጀመሪያ ቻናላችንን ይቀላቀሉ።".to_string(),
        Text::JoinButton => "✅ ቻናሉን ይቀላቀሉ".to_string(),
        Text::SupportUsage => {
            "ለእርዳታ ወይም አስተያየት መልዕክትዎን ከትዕዛዙ ጋር ይላኩ።\nአጠቃቀም: <code>/support መልዕክትዎ</code>"
                .to_string()
        }
        Text::SupportSent => "✅ መልዕክትዎ ለአስተዳዳሪው ተልኳል። እናመሰግናለን!".to_string(),
        Text::SupportNotice {
            name,
            user_id,
            message,
        } => format!(
            "📩 <b>አዲስ የእርዳታ መልዕክት</b>\nከ: {} (<code>{user_id}</code>)\n\n{}",
            esc(name),
            esc(message)
        ),
        Text::SurahUsage => {
            "እባክዎ ትክክለኛ የሱራ ቁጥር ያስገቡ (1-114)።\nአጠቃቀም: <code>/surah 2</code>".to_string()
        }
        Text::JuzUsage => {
            "እባክዎ ትክክለኛ የጁዝ ቁጥር ያስገቡ (1-30)።\nአጠቃቀም: <code>/juz 15</code>".to_string()
        }
        Text::ReciterUsage { command, reciter } => format!(
            "🔊 {}\nእባክዎ ትክክለኛ የሱራ ቁጥር ያስገቡ (1-114)።\nአጠቃቀም: <code>/{} 2</code>",
            esc(reciter),
            esc(command)
        ),
        Text::SurahHeader { number, name } => format!("🕋 ሱራ {number}: {name}"),
        Text::JuzHeader { number } => format!("📗 ጁዝ {number}"),
        Text::AudioLink {
            url,
            reciter,
            surah,
        } => format!(
            "🔊 {} - ሱራ {surah}\n🔗 <a href=\"{}\">ድምጹን ያውርዱ / ያጫውቱ</a>\n\nከላይ ያለውን ሰማያዊ ሊንክ በመጫን ድምጹን በቀጥታ ማዳመጥ ወይም ማውረድ ይችላሉ።",
            esc(reciter),
            esc(url)
        ),
        Text::AudioNotFound { url } => format!(
            "ይቅርታ፣ የድምጽ ፋይሉን ሊንክ ማግኘት አልቻልኩም።\n\n<b>ምክንያት:</b> የድምጽ ፋይሉ በድረ-ገጹ ላይ አልተገኘም።\n<b>የተሞከረው ሊንክ:</b> <code>{}</code>",
            esc(url)
        ),
        Text::FetchFailed => "ይቅርታ፣ መረጃውን ማምጣት አልተቻለም። እባክዎ ትንሽ ቆይተው እንደገና ይሞክሩ።".to_string(),
        Text::PreferenceNotSaved => {
            "⚠️ ምርጫዎን ማስቀመጥ አልተቻለም። በኋላ እንደገና ይሞክሩ።".to_string()
        }
        Text::BroadcastUsage => {
            "አጠቃቀም: <code>/broadcast መልዕክት</code>".to_string()
        }
        Text::BroadcastStarted { total } => format!("📣 መልዕክቱ ለ {total} ተጠቃሚዎች እየተላከ ነው..."),
        Text::BroadcastReport {
            sent,
            failed,
            total,
        } => format!(
            "📣 <b>ስርጭቱ ተጠናቋል</b>\n✅ ተልኳል: {sent}\n❌ አልተሳካም: {failed}\n👥 ጠቅላላ: {total}"
        ),
        Text::RegistryUnavailable => {
            "⚠️ የተጠቃሚዎች መዝገብ አሁን አይገኝም። በኋላ እንደገና ይሞክሩ።".to_string()
        }
        Text::Status(v) => status(
            &v,
            StatusLabels {
                title: "የቦቱ ሁኔታ",
                version: "ስሪት",
                uptime: "የሰራበት ጊዜ",
                users: "ተጠቃሚዎች",
                registry_down: "መዝገቡ አይገኝም",
                channel: "የግዴታ ቻናል",
                channel_off: "አልተዋቀረም",
            },
        ),
        Text::AdminAlert { detail } => {
            format!("⚠️ <b>ያልተጠበቀ ስህተት</b>\n<code>{}</code>", esc(detail))
        }
    }
}

fn en(text: &Text<'_>) -> String {
    match *text {
        Text::Welcome => "Assalamu 'alaikum,\n\nWelcome to the Quran Bot!\n\n\
            📖 <b>For Text:</b>\n<code>/surah &lt;number&gt;</code>\n<code>/juz &lt;number&gt;</code>\n\n\
            🔊 <b>For Audio (Full Surah Link):</b>\n<code>/abdulbasit &lt;number&gt;</code>\n<code>/yasser &lt;number&gt;</code>\n\n\
            ⚙️ <b>Other Commands:</b>\n<code>/language</code> - To change language\n<code>/support</code> - For help"
            .to_string(),
        Text::LanguagePrompt => "Please select a language:".to_string(),
        Text::LanguageSelected => "✅ Language changed to English.".to_string(),
        Text::ForceJoin => "🙏 To use the bot, please join our channel first.".to_string(),
        Text::JoinButton => "✅ Join the channel".to_string(),
        Text::SupportUsage => "For support or feedback, send your message with the command.\nUsage: <code>/support your message</code>".to_string(),
        Text::SupportSent => "✅ Your message has been sent to the admin. Thank you!".to_string(),
        Text::SupportNotice {
            name,
            user_id,
            message,
        } => format!(
            "📩 <b>New support message</b>\nFrom: {} (<code>{user_id}</code>)\n\n{}",
            esc(name),
            esc(message)
        ),
        Text::SurahUsage => {
            "Please provide a valid Surah number (1-114).\nUsage: <code>/surah 2</code>".to_string()
        }
        Text::JuzUsage => {
            "Please provide a valid Juz' number (1-30).\nUsage: <code>/juz 15</code>".to_string()
        }
        Text::ReciterUsage { command, reciter } => format!(
            "🔊 {}\nPlease provide a valid Surah number (1-114).\nUsage: <code>/{} 2</code>",
            esc(reciter),
            esc(command)
        ),
        Text::SurahHeader { number, name } => format!("🕋 Surah {number}: {name}"),
        Text::JuzHeader { number } => format!("📗 Juz' {number}"),
        Text::AudioLink {
            url,
            reciter,
            surah,
        } => format!(
            "🔊 {} - Surah {surah}\n🔗 <a href=\"{}\">Download / Play Audio Here</a>\n\nYou can listen or download the audio by clicking the blue link above.",
            esc(reciter),
            esc(url)
        ),
        Text::AudioNotFound { url } => format!(
            "Sorry, I could not get the audio link.\n\n<b>Reason:</b> The audio file was not found on the server.\n<b>Attempted Link:</b> <code>{}</code>",
            esc(url)
        ),
        Text::FetchFailed => {
            "Sorry, I could not fetch that right now. Please try again later.".to_string()
        }
        Text::PreferenceNotSaved => {
            "⚠️ Your preference could not be saved. Please try again later.".to_string()
        }
        Text::BroadcastUsage => "Usage: <code>/broadcast your message</code>".to_string(),
        Text::BroadcastStarted { total } => format!("📣 Broadcasting to {total} users..."),
        Text::BroadcastReport {
            sent,
            failed,
            total,
        } => format!(
            "📣 <b>Broadcast finished</b>\n✅ Sent: {sent}\n❌ Failed: {failed}\n👥 Total: {total}"
        ),
        Text::RegistryUnavailable => {
            "⚠️ The user registry is unavailable right now. Please try again later.".to_string()
        }
        Text::Status(v) => status(
            &v,
            StatusLabels {
                title: "Bot status",
                version: "Version",
                uptime: "Uptime",
                users: "Users",
                registry_down: "registry unavailable",
                channel: "Required channel",
                channel_off: "not configured",
            },
        ),
        Text::AdminAlert { detail } => {
            format!("⚠️ <b>Unhandled error</b>\n<code>{}</code>", esc(detail))
        }
    }
}

fn ar(text: &Text<'_>) -> String {
    match *text {
        Text::Welcome => "السلام عليكم\n\nأهلاً بك في بوت القرآن!\n\n\
            📖 <b>للنص:</b>\n<code>/surah &lt;رقم&gt;</code>\n<code>/juz &lt;رقم&gt;</code>\n\n\
            🔊 <b>للصوت (رابط السورة كاملة):</b>\n<code>/abdulbasit &lt;رقم&gt;</code>\n<code>/yasser &lt;رقم&gt;</code>\n\n\
            ⚙️ <b>أوامر أخرى:</b>\n<code>/language</code> - لتغيير اللغة\n<code>/support</code> - للمساعدة"
            .to_string(),
        Text::LanguagePrompt => "الرجاء اختيار اللغة:".to_string(),
        Text::LanguageSelected => "✅ تم تغيير اللغة إلى العربية.".to_string(),
        Text::ForceJoin => "🙏 لاستخدام البوت، يرجى الانضمام إلى قناتنا أولاً.".to_string(),
        Text::JoinButton => "✅ انضم إلى القناة".to_string(),
        Text::SupportUsage => "للمساعدة أو الاقتراحات، أرسل رسالتك مع الأمر.\nمثال: <code>/support رسالتك</code>".to_string(),
        Text::SupportSent => "✅ تم إرسال رسالتك إلى المشرف. شكراً لك!".to_string(),
        Text::SupportNotice {
            name,
            user_id,
            message,
        } => format!(
            "📩 <b>رسالة دعم جديدة</b>\nمن: {} (<code>{user_id}</code>)\n\n{}",
            esc(name),
            esc(message)
        ),
        Text::SurahUsage => {
            "الرجاء إدخال رقم سورة صحيح (1-114).\nمثال: <code>/surah 2</code>".to_string()
        }
        Text::JuzUsage => {
            "الرجاء إدخال رقم جزء صحيح (1-30).\nمثال: <code>/juz 15</code>".to_string()
        }
        Text::ReciterUsage { command, reciter } => format!(
            "🔊 {}\nالرجاء إدخال رقم سورة صحيح (1-114).\nمثال: <code>/{} 2</code>",
            esc(reciter),
            esc(command)
        ),
        Text::SurahHeader { number, name } => format!("🕋 سورة {number}: {name}"),
        Text::JuzHeader { number } => format!("📗 الجزء {number}"),
        Text::AudioLink {
            url,
            reciter,
            surah,
        } => format!(
            "🔊 {} - سورة {surah}\n🔗 <a href=\"{}\">تحميل / تشغيل الصوت هنا</a>\n\nيمكنك الاستماع أو تحميل الصوت بالضغط على الرابط الأزرق أعلاه.",
            esc(reciter),
            esc(url)
        ),
        Text::AudioNotFound { url } => format!(
            "عذراً، لم أتمكن من جلب رابط الملف الصوتي.\n\n<b>السبب:</b> لم يتم العثور على الملف الصوتي على الخادم.\n<b>الرابط الذي تمت تجربته:</b> <code>{}</code>",
            esc(url)
        ),
        Text::FetchFailed => "عذراً، تعذر جلب المحتوى الآن. يرجى المحاولة لاحقاً.".to_string(),
        Text::PreferenceNotSaved => "⚠️ تعذر حفظ اختيارك. يرجى المحاولة لاحقاً.".to_string(),
        Text::BroadcastUsage => "مثال: <code>/broadcast رسالتك</code>".to_string(),
        Text::BroadcastStarted { total } => format!("📣 جارٍ الإرسال إلى {total} مستخدم..."),
        Text::BroadcastReport {
            sent,
            failed,
            total,
        } => format!(
            "📣 <b>اكتمل البث</b>\n✅ أُرسلت: {sent}\n❌ فشلت: {failed}\n👥 المجموع: {total}"
        ),
        Text::RegistryUnavailable => {
            "⚠️ سجل المستخدمين غير متاح حالياً. يرجى المحاولة لاحقاً.".to_string()
        }
        Text::Status(v) => status(
            &v,
            StatusLabels {
                title: "حالة البوت",
                version: "الإصدار",
                uptime: "مدة التشغيل",
                users: "المستخدمون",
                registry_down: "السجل غير متاح",
                channel: "القناة المطلوبة",
                channel_off: "غير مهيأة",
            },
        ),
        Text::AdminAlert { detail } => {
            format!("⚠️ <b>خطأ غير متوقع</b>\n<code>{}</code>", esc(detail))
        }
    }
}

fn tr(text: &Text<'_>) -> String {
    match *text {
        Text::Welcome => "Esselamu aleyküm,\n\nKuran Bot'a hoş geldiniz!\n\n\
            📖 <b>Metin İçin:</b>\n<code>/surah &lt;numara&gt;</code>\n<code>/juz &lt;numara&gt;</code>\n\n\
            🔊 <b>Ses İçin (Tam Sure Linki):</b>\n<code>/abdulbasit &lt;numara&gt;</code>\n<code>/yasser &lt;numara&gt;</code>\n\n\
            ⚙️ <b>Diğer Komutlar:</b>\n<code>/language</code> - Dili değiştirmek için\n<code>/support</code> - Yardım için"
            .to_string(),
        Text::LanguagePrompt => "Lütfen bir dil seçin:".to_string(),
        Text::LanguageSelected => "✅ Dil Türkçe olarak değiştirildi.".to_string(),
        Text::ForceJoin => "🙏 Botu kullanmak için lütfen önce kanalımıza katılın.".to_string(),
        Text::JoinButton => "✅ Kanala katıl".to_string(),
        Text::SupportUsage => "Destek veya geri bildirim için mesajınızı komutla birlikte gönderin.\nKullanım: <code>/support mesajınız</code>".to_string(),
        Text::SupportSent => "✅ Mesajınız yöneticiye iletildi. Teşekkürler!".to_string(),
        Text::SupportNotice {
            name,
            user_id,
            message,
        } => format!(
            "📩 <b>Yeni destek mesajı</b>\nGönderen: {} (<code>{user_id}</code>)\n\n{}",
            esc(name),
            esc(message)
        ),
        Text::SurahUsage => {
            "Lütfen geçerli bir Sure numarası girin (1-114).\nKullanım: <code>/surah 2</code>"
                .to_string()
        }
        Text::JuzUsage => {
            "Lütfen geçerli bir Cüz numarası girin (1-30).\nKullanım: <code>/juz 15</code>"
                .to_string()
        }
        Text::ReciterUsage { command, reciter } => format!(
            "🔊 {}\nLütfen geçerli bir Sure numarası girin (1-114).\nKullanım: <code>/{} 2</code>",
            esc(reciter),
            esc(command)
        ),
        Text::SurahHeader { number, name } => format!("🕋 Sure {number}: {name}"),
        Text::JuzHeader { number } => format!("📗 Cüz {number}"),
        Text::AudioLink {
            url,
            reciter,
            surah,
        } => format!(
            "🔊 {} - Sure {surah}\n🔗 <a href=\"{}\">Sesi İndir / Oynat</a>\n\nYukarıdaki mavi bağlantıya tıklayarak sesi dinleyebilir veya indirebilirsiniz.",
            esc(reciter),
            esc(url)
        ),
        Text::AudioNotFound { url } => format!(
            "Üzgünüm, ses bağlantısını alamadım.\n\n<b>Neden:</b> Ses dosyası sunucuda bulunamadı.\n<b>Denenen Bağlantı:</b> <code>{}</code>",
            esc(url)
        ),
        Text::FetchFailed => {
            "Üzgünüm, içerik şu anda alınamadı. Lütfen daha sonra tekrar deneyin.".to_string()
        }
        Text::PreferenceNotSaved => {
            "⚠️ Tercihiniz kaydedilemedi. Lütfen daha sonra tekrar deneyin.".to_string()
        }
        Text::BroadcastUsage => "Kullanım: <code>/broadcast mesajınız</code>".to_string(),
        Text::BroadcastStarted { total } => {
            format!("📣 {total} kullanıcıya gönderiliyor...")
        }
        Text::BroadcastReport {
            sent,
            failed,
            total,
        } => format!(
            "📣 <b>Yayın tamamlandı</b>\n✅ Gönderildi: {sent}\n❌ Başarısız: {failed}\n👥 Toplam: {total}"
        ),
        Text::RegistryUnavailable => {
            "⚠️ Kullanıcı kaydına şu anda ulaşılamıyor. Lütfen daha sonra tekrar deneyin."
                .to_string()
        }
        Text::Status(v) => status(
            &v,
            StatusLabels {
                title: "Bot durumu",
                version: "Sürüm",
                uptime: "Çalışma süresi",
                users: "Kullanıcılar",
                registry_down: "kayıt erişilemiyor",
                channel: "Zorunlu kanal",
                channel_off: "yapılandırılmadı",
            },
        ),
        Text::AdminAlert { detail } => {
            format!("⚠️ <b>Beklenmeyen hata</b>\n<code>{}</code>", esc(detail))
        }
    }
}

struct StatusLabels {
    title: &'static str,
    version: &'static str,
    uptime: &'static str,
    users: &'static str,
    registry_down: &'static str,
    channel: &'static str,
    channel_off: &'static str,
}

fn status(v: &StatusView<'_>, l: StatusLabels) -> String {
    let users = match v.users {
        Some(n) if v.breakdown.is_empty() => n.to_string(),
        Some(n) => format!("{n} ({})", esc(v.breakdown)),
        None => format!("⚠️ {}", l.registry_down),
    };
    let channel = match v.channel {
        Some(c) => format!("<code>{}</code>", esc(c)),
        None => l.channel_off.to_string(),
    };
    format!(
        "📊 <b>{}</b>\n{}: <code>{}</code>\n{}: {}\n{}: {users}\n{}: {channel}",
        l.title,
        l.version,
        esc(v.version),
        l.uptime,
        esc(v.uptime),
        l.users,
        l.channel,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_text() -> Vec<Text<'static>> {
        let surah = SurahNumber::new(2).unwrap();
        vec![
            Text::Welcome,
            Text::LanguagePrompt,
            Text::LanguageSelected,
            Text::ForceJoin,
            Text::JoinButton,
            Text::SupportUsage,
            Text::SupportSent,
            Text::SupportNotice {
                name: "Ali",
                user_id: UserId(9),
                message: "hi",
            },
            Text::SurahUsage,
            Text::JuzUsage,
            Text::ReciterUsage {
                command: "yasser",
                reciter: "Yasser Al-Dosari",
            },
            Text::SurahHeader {
                number: surah,
                name: "Al-Baqara",
            },
            Text::JuzHeader {
                number: JuzNumber::new(30).unwrap(),
            },
            Text::AudioLink {
                url: "https://a/b.mp3",
                reciter: "R",
                surah,
            },
            Text::AudioNotFound {
                url: "https://a/b.mp3",
            },
            Text::FetchFailed,
            Text::PreferenceNotSaved,
            Text::BroadcastUsage,
            Text::BroadcastStarted { total: 3 },
            Text::BroadcastReport {
                sent: 2,
                failed: 1,
                total: 3,
            },
            Text::RegistryUnavailable,
            Text::Status(StatusView {
                version: "0.1.0",
                uptime: "5m 2s",
                users: Some(3),
                breakdown: "am 2 · en 1",
                channel: Some("@chan"),
            }),
            Text::AdminAlert { detail: "boom" },
        ]
    }

    #[test]
    fn every_template_renders_without_leftover_placeholders() {
        for lang in Language::ALL {
            for t in every_text() {
                let out = render(lang, &t);
                assert!(!out.trim().is_empty(), "{lang} {t:?} is empty");
                assert!(!out.contains('{'), "{lang} {t:?} left a placeholder: {out}");
            }
        }
    }

    #[test]
    fn not_found_carries_exact_url() {
        let url = "https://download.quranicaudio.com/quran/abdul_basit_murattal/002.mp3";
        for lang in Language::ALL {
            assert!(render(lang, &Text::AudioNotFound { url }).contains(url));
        }
    }

    #[test]
    fn user_content_is_escaped() {
        let out = render(
            Language::En,
            &Text::SupportNotice {
                name: "<b>x</b>",
                user_id: UserId(1),
                message: "a & b",
            },
        );
        assert!(out.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(out.contains("a &amp; b"));
    }

    #[test]
    fn status_reports_unreachable_registry() {
        let out = render(
            Language::En,
            &Text::Status(StatusView {
                version: "1",
                uptime: "1s",
                users: None,
                breakdown: "",
                channel: None,
            }),
        );
        assert!(out.contains("registry unavailable"));
        assert!(out.contains("not configured"));
    }
}
