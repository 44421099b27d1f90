// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Common French words removed before counting, in removal order.
///
/// Entries may span several words. Duplicates are kept as listed.
pub const FRENCH_STOP_WORDS: &[&str] = &[
    "je", "tu", "il", "elle", "nous", "vous", "ils", "elles", "le", "la", "lui",
    "les", "nous", "vous", "leur", "eux", "celui", "celle", "celui ci", "celui la",
    "celle ci", "celle la", "ceci", "cela", "ca", "ceux", "ceux ci", "ceux la",
    "celles ci", "celles la", "le mien", "le tien", "le sien", "le notre",
    "le votre", "le leur", "la mienne", "la tienne", "la sienne", "la notre",
    "la votre", "la leur", "les miens", "les tiens", "les siens", "les notres",
    "les votres", "les leurs", "les miennes", "les tiennes", "les siennes",
    "les notres", "les votres", "les leurs", "on", "rien", "aucun", "aucune",
    "nul", "nulle", "autre", "ni", "tout", "quelqu", "quelque", "certain",
    "certaine", "certains", "certaines", "plusieurs", "tous", "autres", "qui",
    "que", "quoi", "dont", "ou", "lequel", "laquelle", "duquel", "auquel",
    "lesquels", "desquels", "auxquels", "lesquelles", "desquelles", "auxquelles",
    "apres", "avant", "avec", "chez", "concernant", "contre", "dans", "de",
    "depuis", "derriere", "des", "devant", "durant", "en", "entre", "envers",
    "hormis", "hors", "jusque", "malgre", "moyennant", "outre", "par", "parmi",
    "pendant", "pour", "pres", "sans", "sauf", "selon", "sous", "suivant", "sur",
    "touchant", "vers", "via", "a bas de", "a cause de", "a cote de", "a defaut de",
    "afin de", "a force de", "a la merci", "a la faveur de", "a l egard de",
    "a l encontre de", "a l entour de", "a l exception de", "a l instar de",
    "a l insu de", "a meme", "a moins de", "a partir de", "a raison de",
    "a seule fin de", "a travers", "au dedans de", "au defaut de", "au dehors",
    "au dessous de", "au dessus de", "au lieu de", "au moyen de", "aupres de",
    "aux environs de", "au prix de", "autour de", "aux alentours de",
    "au depens de", "avant de", "d apres", "d avec", "de façon a", "de la part de",
    "de maniere a", "d entre", "de par", "de peur de", "du cote de", "en bas de",
    "en deca de", "en dedans de", "en dehors de", "en depit de", "en face de",
    "en faveur de", "en guise de", "en outre de", "en plus de", "grace a",
    "hors de", "loin de", "lors de", "par rapport a", "par suite de", "pres de",
    "proche de", "quant a", "quitte a", "sauf a", "sous couleur de", "vis a vie de",
    "ainsi", "car", "cependant", "comme", "donc", "si", "et", "quand", "ni", "ou",
    "or", "puis", "que", "pourtant", "lorsque", "neanmoins", "toutefois", "sinon",
    "mais", "soit", "enfin", "puisque", "au reste", "au surplus", "ainsi que",
    "a moins que", "bien que", "tandis", "aussitot", "de peur", "par consequent",
    "c est a dire", "d ailleurs", "vu que", "en outre", "au contraire", "de plus",
    "de maniere", "de sorte", "parce", "alors", "ci", "ma", "ta", "sa", "mon",
    "ton", "son", "mes", "tes", "ses", "nos", "vos", "leurs", "au", "aux", "en",
    "ou", "soi", "et", "par", "etre", "pas", "sur", "plus", "te", "tu", "toi",
    "pour", "je", "me", "moi", "ce", "cet", "cette", "ces", "un", "une", "uns",
    "unes", "comme", "le", "la", "les", "qu", "que", "de", "du", "des", "dans",
    "lui", "elle", "se", "mais", "sans", "ne", "avoir", "faire", "peu", "meme",
    "non", "fois", "vers", "chez", "jusque", "tres", "quel", "quelle", "quels",
    "quelles", "devant", "ici", "oui", "trop", "chaque", "deja", "tant", "avant",
    "enfin", "ah", "voila", "tel", "fait", "est", "oh", "eh", "cas", "sont",
    "suis", "es", "etes", "ete", "sommes", "ont", "eu", "eus", "avait", "avaient",
    "etait", "etaient", "lorsqu", "peut", "peux", "peuvent", "ayant",
];
