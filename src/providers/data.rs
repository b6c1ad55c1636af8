//! Built-in provider table.
//!
//! Provider ids are stable identifiers; rename the title instead. The ids
//! `self`, `unknown`, `nomx` and `nullmx` are reserved. A `*` label in an MX
//! pattern stands for exactly one label.

use phf::phf_map;

pub(super) struct StaticProvider {
    pub mx: &'static [&'static str],
    pub domains: &'static [&'static str],
    pub title: Option<&'static str>,
    pub note: Option<&'static str>,
    pub url: Option<&'static str>,
    pub public: bool,
    pub canonical: StaticCanonical,
}

pub(super) struct StaticCanonical {
    pub lowercase: bool,
    pub strip_periods: bool,
    pub substitute: &'static [(&'static str, &'static str)],
}

const PLAIN: StaticCanonical = StaticCanonical {
    lowercase: false,
    strip_periods: false,
    substitute: &[],
};

const LOWERCASE: StaticCanonical = StaticCanonical {
    lowercase: true,
    strip_periods: false,
    substitute: &[],
};

const fn mx(mx: &'static [&'static str]) -> StaticProvider {
    StaticProvider {
        mx,
        domains: &[],
        title: None,
        note: None,
        url: None,
        public: false,
        canonical: PLAIN,
    }
}

const fn titled(mx: &'static [&'static str], title: &'static str) -> StaticProvider {
    StaticProvider {
        mx,
        domains: &[],
        title: Some(title),
        note: None,
        url: None,
        public: false,
        canonical: PLAIN,
    }
}

const fn public(mx: &'static [&'static str], title: Option<&'static str>) -> StaticProvider {
    StaticProvider {
        mx,
        domains: &[],
        title,
        note: None,
        url: None,
        public: true,
        canonical: PLAIN,
    }
}

pub(super) static PROVIDERS: phf::Map<&'static str, StaticProvider> = phf_map! {
    "i-3.com" => mx(&[
        "*.*.bak-mx.*.smtproutes.com",
        "*.*.*.bak-mx.*.smtproutes.com",
        "*.*.pri-mx.*.smtproutes.com",
        "*.*.*.pri-mx.*.smtproutes.com",
    ]),
    "1and1" => mx(&["*.1and1.com", "*.1and1.co.uk", "*.1and1.fr"]),
    "adista" => mx(&["*.adista.fr"]),
    "amazon-aws" => titled(&["inbound-smtp.*.amazonaws.com"], "Amazon AWS SES"),
    "amazon-aws-ec2" => titled(&["*.*.compute.amazonaws.com"], "Amazon AWS EC2"),
    "anaxa" => mx(&["*.anaxanet.com"]),
    "apple-icloud" => StaticProvider {
        mx: &["*.mail.icloud.com"],
        domains: &["icloud.com", "mac.com", "me.com"],
        title: Some("Apple iCloud"),
        note: None,
        url: None,
        public: true,
        canonical: LOWERCASE,
    },
    "appriver" => mx(&["*.*.*.arsmtp.com", "*.*.*.*.arsmtp.com"]),
    "aol" => titled(&["*.mx.aol.com"], "AOL"),
    "barracuda" => titled(&["*.*.*.*.barracudanetworks.com"], "Barracuda Networks"),
    "carrierzone" => mx(&["*.carrierzone.com"]),
    "cogent" => titled(&["*.mail.cogentco.com"], "Cogent Communications"),
    "cologlobal" => mx(&["*.cologlobal.com"]),
    "cyren" => mx(&["*.*.ctmail.com", "*.expurgate.net"]),
    "cyso" => mx(&["*.cyso.net"]),
    "daemonmail" => mx(&["*.daemonmail.com"]),
    "dewile.net" => mx(&["exchange.dewile.net"]),
    "dreamhost" => titled(
        &["*.mail.dreamhost.com", "*.*.mail.dreamhost.com", "*.*.*.mail.dreamhost.com"],
        "Dreamhost",
    ),
    "easydns" => mx(&["mx.easymail.ca"]),
    "eapps" => mx(&["*.eapps.com"]),
    "emailsrvr" => mx(&["*.emailsrvr.com"]),
    "enom" => mx(&["*.registrar-servers.com"]),
    "everyone.net" => mx(&["*.everyone.net"]),
    "exclusivehosting" => mx(&["*.exclusivehosting.net"]),
    "fakemailgenerator" => public(&["*.fakemailgenerator.com"], None),
    "fastmail" => public(&["*.messagingengine.com"], None),
    "fatcow" => mx(&["mail.fatcow.com"]),
    "fireeye" => mx(&["*.email.fireeyecloud.com", "*.*.email.fireeyecloud.com"]),
    "forcepoint" => mx(&["*.*.mailcontrol.com"]),
    "gandi" => titled(&["mail.gandi.net"], "Gandi.net"),
    "gmx.com" => StaticProvider {
        mx: &["*.gmx.com", "*.gmx.net"],
        domains: &["gmx.com", "gmx.us"],
        title: Some("GMX 1&1 Mail and Media"),
        note: None,
        url: None,
        public: true,
        canonical: PLAIN,
    },
    "godaddy" => titled(
        &[
            "mailstore1.secureserver.net",
            "smtp.secureserver.net",
            "mailstore1.europe.secureserver.net",
            "smtp.europe.secureserver.net",
            "mailstore1.asia.secureserver.net",
            "smtp.asia.secureserver.net",
        ],
        "GoDaddy",
    ),
    "google-gmail" => StaticProvider {
        mx: &["gmail-smtp-in.l.google.com", "*.gmail-smtp-in.l.google.com"],
        domains: &["gmail.com", "googlemail.com"],
        title: Some("Gmail"),
        note: None,
        url: Some("https://gmail.com/"),
        public: true,
        canonical: StaticCanonical {
            lowercase: true,
            strip_periods: true,
            substitute: &[("googlemail.com", "gmail.com")],
        },
    },
    "google-apps" => StaticProvider {
        mx: &[
            "aspmx.l.google.com",
            "*.aspmx.l.google.com",
            "smtp.google.com",
            "*.googlemail.com",
            "gmr-smtp-in.l.google.com",
            "*.gmr-smtp-in.l.google.com",
            "*.*.*.psmtp.com",
            "*.*.*.*.psmtp.com",
        ],
        domains: &[],
        title: Some("Google Workspace"),
        note: None,
        url: None,
        public: false,
        canonical: StaticCanonical {
            lowercase: true,
            strip_periods: true,
            substitute: &[],
        },
    },
    "hostcentral" => mx(&["*.hostcentral.net"]),
    "hostedemail" => mx(&["mx.*.*.*.hostedemail.com", "mx.*.*.*.*.hostedemail.com"]),
    "hostignition" => mx(&["*.ignitionserver.net"]),
    "hostinger" => mx(&["*.hostinger.in"]),
    "hostmonster" => mx(&["*.hostmonster.com"]),
    "ifastnet" => mx(&["mx.byethost3.com"]),
    "inbox.com" => public(&["*.inbox.com"], None),
    "intermedia" => mx(&["*.intermedia.net"]),
    "ix" => mx(&["*.ixwebhosting.com"]),
    "justhost" => mx(&["*.justhost.com"]),
    "lfchosting" => mx(&["*.loosefoot.com"]),
    "libraesva" => mx(&["*.esvacloud.com"]),
    "liquidnet" => mx(&["*.supremebox.com"]),
    "logix" => mx(&["*.logix.in"]),
    "mail.com" => public(&["*.mail.com"], Some("Mail.com, a 1&1 company")),
    "mailchimp-mandrill" => titled(&["*.*.mandrillapp.com"], "Mailchimp Mandrill"),
    "mailhostbox" => mx(&["*.mailhostbox.com"]),
    "mailinator" => public(&["*.mailinator.com", "mx.powered.name"], Some("Mailinator")),
    "mailgun" => mx(&["*.mailgun.org"]),
    "mcafee-mxlogic" => mx(&["*.*.*.mxlogic.net", "*.*.*.*.mxlogic.net"]),
    "megamailservers" => mx(&["*.megamailservers.com"]),
    "migadu" => mx(&["*.migadu.com"]),
    "mimecast" => mx(&["*.mimecast.com"]),
    "mochahost" => mx(&["*.mochahost.com"]),
    "mxroute" => mx(&["*.mxroute.com"]),
    "name.com" => mx(&["*.name.com"]),
    "namecheap-privateemail" => mx(&["*.privateemail.com"]),
    "namecheap-webhosting" => mx(&["*.web-hosting.com"]),
    "net4india" => mx(&["mail.net4india.com"]),
    "netcore" => titled(&["*.netcore.co.in"], "Netcore"),
    "netmagic" => mx(&["*.netmagicians.com"]),
    "networksolutions" => titled(
        &[
            "*.netsolmail.net",
            "*.*.netsolmail.net",
            "*.*.*.netsolmail.net",
            "*.*.*.*.netsolmail.net",
        ],
        "Network Solutions",
    ),
    "one.com" => mx(&["*.one.com"]),
    "outlook-bizmail" => titled(&["*.mail.*.outlook.com"], "Microsoft Outlook"),
    "outlook-hotmail" => StaticProvider {
        mx: &["*.hotmail.com", "*.olc.protection.outlook.com"],
        domains: &["hotmail.com", "msn.com", "outlook.co", "outlook.com", "live.com", "live.in"],
        title: Some("Microsoft Outlook Hotmail"),
        note: None,
        url: None,
        public: true,
        canonical: LOWERCASE,
    },
    "ovh" => mx(&["*.ovh.net"]),
    "pair" => mx(&["*.pair.com"]),
    "parklogic" => mx(&["*.parklogic.com"]),
    "pobox" => mx(&["*.pobox.com"]),
    "postmarkapp" => mx(&["inbound.postmarkapp.com"]),
    "poponline" => mx(&["*.pop.co"]),
    "private-h-email" => mx(&["mail.h-email.net"]),
    "private-mxproc" => mx(&["mail.mxproc.com"]),
    "private-nickstel" => mx(&["mail.nickstel.com"]),
    "private-posthost" => mx(&["*.post-host.net"]),
    "private-serverdata" => mx(&["*.smtp.*.serverdata.net"]),
    "private-usermail" => mx(&["*.user-mail.net"]),
    "prodigy" => mx(&["*.prodigy.net"]),
    "proofpoint" => mx(&["*.pphosted.com", "*.*.pphosted.com"]),
    "protonmail" => StaticProvider {
        mx: &["*.protonmail.ch"],
        domains: &[],
        title: Some("Protonmail"),
        note: Some("Protonmail offers both public and private email on the same MX servers"),
        url: None,
        public: false,
        canonical: PLAIN,
    },
    "qq" => mx(&["*.qq.com"]),
    "rediffmail" => public(&["mx.rediffmail.rediff.akadns.net"], Some("Rediffmail")),
    "rediffmail-pro" => titled(&["mail.rediffmailpro.com"], "Rediffmail Pro"),
    "register.com" => mx(&["*.register.com"]),
    "reliance-data-center" => mx(&["*.rilinfo.net"]),
    "runbox" => mx(&["mx.runbox.com"]),
    "safentrix" => mx(&["*.*.safentrix.com"]),
    "salushosting" => mx(&["mail.salushosting.com"]),
    "sendgrid" => titled(&["mx.sendgrid.net"], "Sendgrid"),
    "servage" => mx(&["*.servage.net"]),
    "servergrid" => mx(&["*.securedc.com"]),
    "sherweb" => mx(&["*.sherweb2010.com"]),
    "siteground" => mx(&["mailspamprotection.com"]),
    "spamexperts" => mx(&[
        "mx.spamexperts.com",
        "fallbackmx.spamexperts.eu",
        "lastmx.spamexperts.net",
    ]),
    "spamh" => mx(&["*.*.spamh.com"]),
    "symantec-messagelabs" => mx(&["*.*.messagelabs.com", "*.inboundmx.com"]),
    "tempmail" => mx(&["*.temp-mail.org", "*.temp-mail.ru"]),
    "webcreationuk" => mx(&["*.webcreationuk.com"]),
    "webfaction" => mx(&["*.webfaction.com"]),
    "webindia" => mx(&["*.webindia.com"]),
    "yahoo-corp" => mx(&["*.corp.*.yahoo.com"]),
    "yahoo-mail" => StaticProvider {
        mx: &[
            "*.am0.yahoodns.net",
            "mx-eu.mail.*.yahoodns.net",
            "mx-apac.mail.*.yahoodns.net",
            "*.mail.yahoo.co.jp",
        ],
        domains: &["rocketmail.com", "yahoo.com", "yahoo.co.uk", "yahoo.co.in", "ymail.com", "yahoo.co.jp"],
        title: Some("Yahoo Mail"),
        note: None,
        url: None,
        public: true,
        canonical: StaticCanonical {
            lowercase: true,
            strip_periods: false,
            substitute: &[
                ("rocketmail.com", "yahoo.com"),
                ("yahoo.co.uk", "yahoo.com"),
                ("yahoo.co.in", "yahoo.com"),
                ("ymail.com", "yahoo.com"),
            ],
        },
    },
    "yahoo-smallbiz" => titled(
        &["mx-biz.mail.am0.yahoodns.net", "*.biz.mail.yahoo.com"],
        "Yahoo Small Business",
    ),
    "yandex" => StaticProvider {
        mx: &["mx.yandex.ru"],
        domains: &["yandex.com", "yandex.ru"],
        title: Some("Yandex"),
        note: None,
        url: None,
        public: true,
        canonical: LOWERCASE,
    },
    "yandex-hosted" => StaticProvider {
        mx: &["mx.yandex.net"],
        domains: &[],
        title: Some("Yandex Hosted"),
        note: None,
        url: None,
        public: false,
        canonical: LOWERCASE,
    },
    "yodns" => mx(&["*.yodns.com"]),
    "zimbra-cloudzimail" => mx(&["*.cloudzimail.com"]),
    "zoho" => StaticProvider {
        mx: &["*.zoho.com", "*.zohomail.com"],
        domains: &[],
        title: Some("Zoho"),
        note: Some(
            "Zoho provides both a public webmail service and custom domain hosting with the same MX servers",
        ),
        url: None,
        public: false,
        canonical: LOWERCASE,
    },
};
